pub(crate) mod blur;
pub(crate) mod composite;
pub(crate) mod compositor;
pub(crate) mod cpu;
pub(crate) mod rack;
pub(crate) mod surface;
