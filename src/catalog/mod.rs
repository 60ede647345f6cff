pub(crate) mod client;
pub(crate) mod fetch;
pub(crate) mod offline;
pub(crate) mod retry;
pub(crate) mod source;
pub(crate) mod spotify;
