pub(crate) mod bitmap;
pub(crate) mod blend;
pub(crate) mod cpu;
pub(crate) mod surface;
