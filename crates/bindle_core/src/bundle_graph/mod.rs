mod bundle_graph;

pub use self::bundle_graph::*;
