/// `POST /chat`.
pub mod chat;
