//! Pre-processing for frozen computation graphs.
//!
//! A frozen graph is a mapping from node name to node, where each node carries
//! an operator type and the names of the nodes it feeds into. Before any
//! latency estimation can run over such a graph, three things are needed:
//!
//! - a deterministic linear execution order honoring data dependencies,
//!   starting from one or more designated entry nodes ([`execution_order`]);
//! - for operator nodes consuming learned parameters, the names of the sibling
//!   nodes holding those parameters ([`find_weight_roots`]);
//! - the flat numeric contents of a parameter node's tensor record, whichever
//!   way the producer encoded them ([`tensor_value`]).
//!
//! All three are pure functions over immutable borrows; the graph and its
//! tensor records stay owned by the caller.

pub mod graph;
pub mod sequence;
pub mod tensor;
pub mod weights;

pub use graph::{Graph, GraphError, Node, NodeAttr};
pub use sequence::execution_order;
pub use tensor::{TensorData, TensorError, TensorRecord, shape_height, shape_width, tensor_value};
pub use weights::{WeightOp, find_weight_roots};
