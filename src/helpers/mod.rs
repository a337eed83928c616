pub mod http_client;
pub mod identity_store;
pub mod lastfm;
pub mod sanitize;
pub mod timeago;
pub mod youtube;
