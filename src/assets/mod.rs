pub(crate) mod covers;
pub(crate) mod decode;
