use crate::buffer::Buffer;
use crate::error::DendriteError;
use crate::tensor::Tensor;
use std::collections::{HashMap, HashSet};

/// Identity of a graph node (address of the tensor's shared data).
pub type NodeId = usize;

/// Performs a topological sort of the graph ending at `root`.
///
/// Returns tensors ordered so that every tensor appears after all of its
/// inputs; iterating the result in reverse visits each creator only once all
/// of its consumers have been visited. Iterative DFS, so deep unrolled
/// recurrent graphs do not exhaust the stack.
pub fn topological_sort(root: &Tensor) -> Vec<Tensor> {
    let mut sorted = Vec::new();
    let mut visited: HashSet<NodeId> = HashSet::new();
    // (node, inputs already expanded)
    let mut stack: Vec<(Tensor, bool)> = vec![(root.clone(), false)];

    while let Some((node, expanded)) = stack.pop() {
        let id = node.node_id();
        if expanded {
            sorted.push(node);
            continue;
        }
        if !visited.insert(id) {
            continue;
        }
        let inputs: Vec<Tensor> = node
            .read_data()
            .creator
            .as_ref()
            .map(|c| c.inputs.clone())
            .unwrap_or_default();
        stack.push((node, true));
        for input in inputs.into_iter().rev() {
            if !visited.contains(&input.node_id()) {
                stack.push((input, false));
            }
        }
    }
    sorted
}

/// Reverse-mode traversal from `root` seeded with `grad_output`.
///
/// Gradients flowing into an intermediate tensor are summed in a pending map
/// until every consumer has contributed, then its creator's backward runs
/// exactly once. Leaves accumulate into their own gradient (and into their
/// parameter, when bound to one). Creator links are taken out of each node as
/// it is processed, so the graph is consumed by the pass; a later traversal
/// that reaches a consumed node fails with `GraphIntegrity`.
pub fn backward(root: &Tensor, grad_output: Buffer) -> Result<(), DendriteError> {
    let order = topological_sort(root);
    // Checked before any backward runs, so a rejected pass changes nothing.
    if let Some(node) = order.iter().find(|n| n.is_consumed()) {
        return Err(DendriteError::GraphIntegrity(format!(
            "graph node of shape {:?} was already consumed by an earlier backward",
            node.shape()
        )));
    }
    if root.is_leaf() {
        return Err(DendriteError::MissingCreator);
    }
    log::debug!("backward: visiting {} graph nodes", order.len());

    let mut pending: HashMap<NodeId, Buffer> = HashMap::new();
    pending.insert(root.node_id(), grad_output);

    for node in order.iter().rev() {
        if node.is_leaf() {
            continue;
        }
        let id = node.node_id();
        let grad = pending.remove(&id).ok_or_else(|| {
            DendriteError::GraphIntegrity(format!(
                "no pending gradient for node produced by {:?}",
                node.creator_name()
            ))
        })?;
        let mut creator = {
            let mut data = node.write_data();
            data.consumed = true;
            match data.creator.take() {
                Some(creator) => creator,
                None => return Err(DendriteError::MissingCreator),
            }
        };
        let input_grads = creator.op.backward(&grad)?;
        if input_grads.len() != creator.inputs.len() {
            return Err(DendriteError::ArityMismatch {
                operation: format!("{} backward", creator.op.name()),
                expected: creator.inputs.len(),
                actual: input_grads.len(),
            });
        }
        for (input, input_grad) in creator.inputs.iter().zip(input_grads) {
            if input_grad.shape() != input.shape().as_slice() {
                return Err(DendriteError::ShapeMismatch {
                    expected: input.shape(),
                    actual: input_grad.shape().to_vec(),
                    operation: format!("{} backward", creator.op.name()),
                });
            }
            if input.is_leaf() {
                input.accumulate_gradient(&input_grad)?;
            } else {
                match pending.get_mut(&input.node_id()) {
                    Some(existing) => *existing += &input_grad,
                    None => {
                        pending.insert(input.node_id(), input_grad);
                    }
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "graph_test.rs"]
mod tests;
