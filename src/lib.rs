#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use marshal_codec as codec;
pub use marshal_json as json;
pub use marshal_reflect as reflect;
pub use marshal_utils as utils;
