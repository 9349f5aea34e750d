pub mod models;
pub mod users;
pub mod sessions;
pub mod notes;

pub use models::{User, Session, Note};
pub use users::UserRepository;
pub use sessions::SessionRepository;
pub use notes::NoteRepository;
