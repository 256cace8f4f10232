//! Gradient boosted tree ensembles in the XGBoost JSON dump format
//!
//! Each tree is the nested node structure written by
//! `Booster.get_dump(dump_format="json")`. A split node sends a row to `yes`
//! when `value < split_condition`, to `no` otherwise and to `missing` when the
//! value is NaN. The comparison is done in `f32` on both sides, as the booster
//! does, so values that round to the threshold take the `no` branch. The
//! prediction is `base_score` plus the sum of the leaves reached in every tree.
//!
//! `base_score` has no default: recent boosters estimate it from the training
//! data, so an artifact must carry the value it was trained with.

use crate::error::{ForecastError, Result};
use crate::models::{check_width, RegressionModel};
use crate::schema::FeatureSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Serialized ensemble parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeEnsembleSpec {
    /// Global bias added to the sum of leaves
    pub base_score: f64,
    /// Root node of every tree
    pub trees: Vec<TreeNodeSpec>,
}

/// One node of a dumped tree
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNodeSpec {
    Split {
        nodeid: u32,
        /// Schema feature name, or `f<index>`
        split: String,
        split_condition: f64,
        yes: u32,
        no: u32,
        missing: u32,
        children: Vec<TreeNodeSpec>,
    },
    Leaf {
        nodeid: u32,
        leaf: f64,
    },
}

impl TreeNodeSpec {
    fn nodeid(&self) -> u32 {
        match self {
            TreeNodeSpec::Split { nodeid, .. } | TreeNodeSpec::Leaf { nodeid, .. } => *nodeid,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Node {
    Split {
        feature: usize,
        threshold: f32,
        yes: usize,
        no: usize,
        missing: usize,
    },
    Leaf(f64),
}

/// A tree flattened into an arena; the root is at position 0
#[derive(Debug, Clone)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn compile(root: &TreeNodeSpec, schema: &FeatureSchema) -> Result<Self> {
        let mut nodes = Vec::new();
        Self::push(root, schema, &mut nodes)?;
        Ok(Self { nodes })
    }

    /// Append a subtree and return the arena position of its root
    fn push(spec: &TreeNodeSpec, schema: &FeatureSchema, nodes: &mut Vec<Node>) -> Result<usize> {
        let position = nodes.len();

        match spec {
            TreeNodeSpec::Leaf { leaf, .. } => {
                nodes.push(Node::Leaf(*leaf));
            }
            TreeNodeSpec::Split {
                nodeid,
                split,
                split_condition,
                yes,
                no,
                missing,
                children,
            } => {
                let feature = resolve_feature(split, schema)?;
                // Placeholder until the children have positions.
                nodes.push(Node::Leaf(0.0));

                let mut child_positions = HashMap::with_capacity(children.len());
                for child in children {
                    let child_position = Self::push(child, schema, nodes)?;
                    child_positions.insert(child.nodeid(), child_position);
                }

                let child = |target: &u32| {
                    child_positions.get(target).copied().ok_or_else(|| {
                        ForecastError::ModelLoad(format!(
                            "node {} points to {} which is not one of its children",
                            nodeid, target
                        ))
                    })
                };

                nodes[position] = Node::Split {
                    feature,
                    threshold: *split_condition as f32,
                    yes: child(yes)?,
                    no: child(no)?,
                    missing: child(missing)?,
                };
            }
        }

        Ok(position)
    }

    fn leaf_value(&self, input: &[f64]) -> f64 {
        let mut position = 0;
        loop {
            match self.nodes[position] {
                Node::Leaf(value) => return value,
                Node::Split {
                    feature,
                    threshold,
                    yes,
                    no,
                    missing,
                } => {
                    let value = input[feature] as f32;
                    position = if value.is_nan() {
                        missing
                    } else if value < threshold {
                        yes
                    } else {
                        no
                    };
                }
            }
        }
    }
}

fn resolve_feature(split: &str, schema: &FeatureSchema) -> Result<usize> {
    if let Some(position) = schema.position(split) {
        return Ok(position);
    }

    split
        .strip_prefix('f')
        .and_then(|index| index.parse::<usize>().ok())
        .filter(|&index| index < schema.width())
        .ok_or_else(|| {
            ForecastError::ModelLoad(format!(
                "split on unknown feature '{}' for schema '{}'",
                split, schema.version
            ))
        })
}

/// Sum-of-trees regression model
#[derive(Debug, Clone)]
pub struct TreeEnsemble {
    name: String,
    base_score: f64,
    width: usize,
    trees: Vec<Tree>,
}

impl TreeEnsemble {
    /// Compile dumped trees against the given schema
    pub fn from_spec(name: String, spec: TreeEnsembleSpec, schema: &FeatureSchema) -> Result<Self> {
        if spec.trees.is_empty() {
            return Err(ForecastError::ModelLoad(
                "tree ensemble has no trees".to_string(),
            ));
        }

        let trees = spec
            .trees
            .iter()
            .map(|root| Tree::compile(root, schema))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name,
            base_score: spec.base_score,
            width: schema.width(),
            trees,
        })
    }
}

impl RegressionModel for TreeEnsemble {
    fn predict(&self, input: &[f64]) -> Result<f64> {
        check_width(&self.name, self.width, input)?;

        Ok(self.base_score
            + self
                .trees
                .iter()
                .map(|tree| tree.leaf_value(input))
                .sum::<f64>())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;
    use serde_json::json;

    /// pm10 < 50 ? (pm25_lag1 < 20 ? 1.0 : 2.0) : 3.0, missing pm10 goes right
    fn stump_tree() -> serde_json::Value {
        json!({
            "nodeid": 0, "depth": 0, "split": "pm10", "split_condition": 50.0,
            "yes": 1, "no": 2, "missing": 2,
            "children": [
                {
                    "nodeid": 1, "depth": 1, "split": "f12", "split_condition": 20.0,
                    "yes": 3, "no": 4, "missing": 3,
                    "children": [
                        { "nodeid": 3, "leaf": 1.0 },
                        { "nodeid": 4, "leaf": 2.0 }
                    ]
                },
                { "nodeid": 2, "leaf": 3.0 }
            ]
        })
    }

    fn ensemble(trees: Vec<serde_json::Value>) -> Result<TreeEnsemble> {
        let spec: TreeEnsembleSpec =
            serde_json::from_value(json!({ "base_score": 0.5, "trees": trees })).unwrap();
        TreeEnsemble::from_spec("test".to_string(), spec, &FeatureSchema::current())
    }

    fn input(pm10: f64, lag1: f64) -> [f64; 17] {
        let mut input = [0.0; 17];
        input[0] = pm10;
        input[12] = lag1;
        input
    }

    #[rstest]
    #[case(10.0, 5.0, 1.5)]
    #[case(10.0, 25.0, 2.5)]
    #[case(60.0, 5.0, 3.5)]
    #[case(50.0, 5.0, 3.5)]
    #[case(f64::NAN, 5.0, 3.5)]
    fn test_routing(#[case] pm10: f64, #[case] lag1: f64, #[case] expected: f64) {
        let model = ensemble(vec![stump_tree()]).unwrap();
        assert_relative_eq!(model.predict(&input(pm10, lag1)).unwrap(), expected);
    }

    #[test]
    fn test_trees_are_summed() {
        let model = ensemble(vec![stump_tree(), json!({ "nodeid": 0, "leaf": -0.25 })]).unwrap();
        assert_relative_eq!(model.predict(&input(10.0, 5.0)).unwrap(), 0.5 + 1.0 - 0.25);
    }

    /// Single split on pm10 at `threshold`: 1.0 below, 2.0 otherwise
    fn split_at(threshold: f64) -> serde_json::Value {
        json!({
            "nodeid": 0, "split": "pm10", "split_condition": threshold,
            "yes": 1, "no": 2, "missing": 1,
            "children": [
                { "nodeid": 1, "leaf": 1.0 },
                { "nodeid": 2, "leaf": 2.0 }
            ]
        })
    }

    #[rstest]
    // 0.100000001 and 0.1 are the same f32
    #[case(0.100000001, 0.1, 2.5)]
    #[case(0.100000001, 0.0999, 1.5)]
    #[case(1.0, 1.0 - 1e-9, 2.5)]
    #[case(1.0, 1.0 - 1e-6, 1.5)]
    fn test_split_compares_in_f32(
        #[case] threshold: f64,
        #[case] pm10: f64,
        #[case] expected: f64,
    ) {
        let model = ensemble(vec![split_at(threshold)]).unwrap();
        assert_relative_eq!(model.predict(&input(pm10, 0.0)).unwrap(), expected);
    }

    #[test]
    fn test_base_score_is_required() {
        let result = serde_json::from_value::<TreeEnsembleSpec>(
            json!({ "trees": [{ "nodeid": 0, "leaf": 1.0 }] }),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_split_feature() {
        let mut tree = stump_tree();
        tree["split"] = json!("pm25");
        let err = ensemble(vec![tree]).unwrap_err();
        assert!(err.to_string().contains("unknown feature 'pm25'"));

        let mut tree = stump_tree();
        tree["split"] = json!("f17");
        assert!(ensemble(vec![tree]).is_err());
    }

    #[test]
    fn test_dangling_child_reference() {
        let mut tree = stump_tree();
        tree["no"] = json!(9);
        let err = ensemble(vec![tree]).unwrap_err();
        assert!(err.to_string().contains("node 0 points to 9"));
    }

    #[test]
    fn test_empty_ensemble_rejected() {
        assert!(ensemble(vec![]).is_err());
    }
}
