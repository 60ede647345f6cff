pub(crate) mod classify;
pub(crate) mod groups;
pub(crate) mod table;
