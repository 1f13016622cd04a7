pub(crate) mod composer;
pub(crate) mod host;
pub(crate) mod opts;
