pub(crate) mod animated_gif;
