pub(crate) mod headless;
