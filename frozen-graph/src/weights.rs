//! Weight-root resolution.
//!
//! Frozen graphs store learned parameters in dedicated nodes whose names
//! follow the exporter's naming convention: a convolution `layer1/Conv2D`
//! keeps its kernel in a sibling named `layer1/weight` (or `layer1/kernel`).
//! [`find_weight_roots`] resolves those siblings from a node's own name,
//! using a fixed per-operator table of suffix rewrites.

use tracing::info;

use crate::graph::{Graph, Node};

/// Operator kinds whose computation consumes a learned parameter tensor held
/// by another node.
///
/// A closed enum rather than a lookup table, so adding a kind forces the
/// rewrite list below to be extended with it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WeightOp {
    Conv2D,
    DepthwiseConv2dNative,
    BiasAdd,
    FusedBatchNorm,
    MatMul,
}

impl WeightOp {
    pub fn from_op_type(op_type: &str) -> Option<Self> {
        match op_type {
            "Conv2D" => Some(Self::Conv2D),
            "DepthwiseConv2dNative" => Some(Self::DepthwiseConv2dNative),
            "BiasAdd" => Some(Self::BiasAdd),
            "FusedBatchNorm" => Some(Self::FusedBatchNorm),
            "MatMul" => Some(Self::MatMul),
            _ => None,
        }
    }

    /// Name rewrites `(suffix, replacement)` deriving the candidate weight
    /// node names from the operator's own name, applied in order.
    fn rewrites(self) -> &'static [(&'static str, &'static str)] {
        match self {
            WeightOp::Conv2D => &[("/Conv2D", "/weight"), ("/Conv2D", "/kernel")],
            WeightOp::DepthwiseConv2dNative => &[("/depthwise", "/weight")],
            WeightOp::BiasAdd => &[("/BiasAdd", "/bias")],
            WeightOp::FusedBatchNorm => &[
                ("/FusedBatchNormV3", "/gamma"),
                ("/FusedBatchNormV3", "/beta"),
                ("/FusedBatchNormV3", "/moving_mean"),
                ("/FusedBatchNormV3", "/moving_variance"),
            ],
            WeightOp::MatMul => &[("/MatMul", "/weight")],
        }
    }
}

/// Returns the names of the nodes holding `node`'s learned parameters, in
/// rule order.
///
/// A candidate derived from a rewrite is accepted only when it exists in the
/// graph and is not an `Identity` alias. Operator types with no rewrite rules
/// yield an empty result; that is the normal outcome for any
/// non-parameter-bearing node, not an error.
pub fn find_weight_roots<'a>(graph: &'a Graph, node: &Node) -> Vec<&'a str> {
    let Some(op) = WeightOp::from_op_type(node.op_type()) else {
        return Vec::new();
    };

    let mut roots = Vec::new();
    for &(suffix, replacement) in op.rewrites() {
        let candidate = node.name().replace(suffix, replacement);
        if let Some((key, holder)) = graph.get_entry(&candidate) {
            if !holder.is_identity() {
                info!("Find node {} with its weight op {}.", node.name(), key);
                roots.push(key);
            }
        }
    }
    roots
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(nodes: impl IntoIterator<Item = (&'static str, &'static str)>) -> Graph {
        nodes
            .into_iter()
            .map(|(name, op_type)| Node::new(name, op_type))
            .collect()
    }

    #[test]
    fn conv_resolves_weight() {
        let g = graph([("layer1/Conv2D", "Conv2D"), ("layer1/weight", "Const")]);
        let node = g.node("layer1/Conv2D").unwrap();
        assert_eq!(find_weight_roots(&g, node), vec!["layer1/weight"]);
    }

    #[test]
    fn conv_falls_back_to_kernel() {
        let g = graph([("layer1/Conv2D", "Conv2D"), ("layer1/kernel", "Const")]);
        let node = g.node("layer1/Conv2D").unwrap();
        assert_eq!(find_weight_roots(&g, node), vec!["layer1/kernel"]);
    }

    #[test]
    fn conv_returns_both_weight_and_kernel_when_present() {
        let g = graph([
            ("layer1/Conv2D", "Conv2D"),
            ("layer1/weight", "Const"),
            ("layer1/kernel", "Const"),
        ]);
        let node = g.node("layer1/Conv2D").unwrap();
        assert_eq!(
            find_weight_roots(&g, node),
            vec!["layer1/weight", "layer1/kernel"]
        );
    }

    #[test]
    fn identity_candidates_are_excluded() {
        let g = graph([("layer1/Conv2D", "Conv2D"), ("layer1/weight", "Identity")]);
        let node = g.node("layer1/Conv2D").unwrap();
        assert!(find_weight_roots(&g, node).is_empty());
    }

    #[test]
    fn fused_batch_norm_resolves_all_four_in_order() {
        let g = graph([
            ("bn1/FusedBatchNormV3", "FusedBatchNorm"),
            ("bn1/gamma", "Const"),
            ("bn1/beta", "Const"),
            ("bn1/moving_mean", "Const"),
            ("bn1/moving_variance", "Const"),
        ]);
        let node = g.node("bn1/FusedBatchNormV3").unwrap();
        assert_eq!(
            find_weight_roots(&g, node),
            vec![
                "bn1/gamma",
                "bn1/beta",
                "bn1/moving_mean",
                "bn1/moving_variance"
            ]
        );
    }

    #[test]
    fn fused_batch_norm_skips_missing_parameters() {
        let g = graph([
            ("bn1/FusedBatchNormV3", "FusedBatchNorm"),
            ("bn1/gamma", "Const"),
            ("bn1/moving_variance", "Const"),
        ]);
        let node = g.node("bn1/FusedBatchNormV3").unwrap();
        assert_eq!(
            find_weight_roots(&g, node),
            vec!["bn1/gamma", "bn1/moving_variance"]
        );
    }

    #[test]
    fn depthwise_and_bias_and_matmul() {
        let g = graph([
            ("layer2/depthwise", "DepthwiseConv2dNative"),
            ("layer2/weight", "Const"),
            ("layer3/BiasAdd", "BiasAdd"),
            ("layer3/bias", "Const"),
            ("fc/MatMul", "MatMul"),
            ("fc/weight", "Const"),
        ]);
        let depthwise = g.node("layer2/depthwise").unwrap();
        assert_eq!(find_weight_roots(&g, depthwise), vec!["layer2/weight"]);
        let bias_add = g.node("layer3/BiasAdd").unwrap();
        assert_eq!(find_weight_roots(&g, bias_add), vec!["layer3/bias"]);
        let matmul = g.node("fc/MatMul").unwrap();
        assert_eq!(find_weight_roots(&g, matmul), vec!["fc/weight"]);
    }

    #[test]
    fn non_weight_bearing_op_yields_empty() {
        let g = graph([("relu1/Relu", "Relu"), ("relu1/weight", "Const")]);
        let node = g.node("relu1/Relu").unwrap();
        assert!(find_weight_roots(&g, node).is_empty());
    }

    #[test]
    fn absent_candidates_yield_empty() {
        let g = graph([("layer1/Conv2D", "Conv2D")]);
        let node = g.node("layer1/Conv2D").unwrap();
        assert!(find_weight_roots(&g, node).is_empty());
    }
}
