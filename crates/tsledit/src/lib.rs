#![forbid(unsafe_code)]

pub use tsledit_core as core;
pub use tsledit_xml as xml;
pub use tsledit_c14n as c14n;
pub use tsledit_crypto as crypto;
pub use tsledit_keys as keys;
pub use tsledit_transforms as transforms;
pub use tsledit_dsig as dsig;
pub use tsledit_list as list;
