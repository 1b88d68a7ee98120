//! Rebuild pass: apply planned scopes to a sibling list.

use crate::model::{IndentBlock, Sense, SenseKind};

use super::plan::{ScopeAction, TransitionScope};

/// Apply a non-overlapping plan to a sibling list, consuming it.
///
/// Each slot of the original list maps to zero, one, or two output
/// senses: governed senses vanish from their slot (they move under a
/// container), a carrier slot yields the stripped carrier followed by
/// its container, and a carrier left with no content of its own is
/// replaced by the container outright. Relative order of everything
/// that stays at this level is preserved.
pub fn apply_scopes(siblings: Vec<Sense>, scopes: &[TransitionScope]) -> Vec<Sense> {
    let mut slots: Vec<Vec<Sense>> = siblings.into_iter().map(|s| vec![s]).collect();

    for scope in scopes {
        let mut governed = Vec::with_capacity(scope.span.len());
        for k in scope.span.clone() {
            governed.extend(std::mem::take(&mut slots[k]));
        }

        let mut carrier = match std::mem::take(&mut slots[scope.carrier]).pop() {
            Some(sense) => sense,
            None => continue,
        };
        let transition = carrier.blocks.pop();
        let container = make_container(scope, transition, governed);

        if carrier.is_empty() {
            slots[scope.carrier] = vec![container];
        } else {
            slots[scope.carrier] = vec![carrier, container];
        }
    }

    slots.into_iter().flatten().collect()
}

/// Build the synthetic container sense for one scope. The transition
/// block rides along as the container's own block so the source of the
/// restructuring stays visible in the model.
fn make_container(
    scope: &TransitionScope,
    transition: Option<IndentBlock>,
    governed: Vec<Sense>,
) -> Sense {
    let kind = match &scope.action {
        ScopeAction::Nest { form, pos } => SenseKind::SubEntry {
            form: form.clone(),
            pos: pos.clone(),
        },
        ScopeAction::Group { label } => SenseKind::UsageGroup {
            label: label.clone(),
        },
    };

    let mut container = Sense::new(scope.transition_text.clone());
    container.raw = scope.transition_raw.clone();
    container.kind = kind;
    if let Some(block) = transition {
        container.blocks.push(block);
    }
    container.children = governed;
    container
}

/// Group a sense's blocks under intra-sense markers.
///
/// A marker is a transition or nature-label block among the sense's
/// sibling blocks; the blocks that follow it, up to the next marker,
/// become its children. Blocks before the first marker stay where they
/// are. Returns how many blocks were moved.
pub fn group_blocks(blocks: &mut Vec<IndentBlock>) -> usize {
    let plan = plan_groups(blocks);
    if plan.is_empty() {
        return 0;
    }

    let mut moved = 0;
    let mut slots: Vec<Option<IndentBlock>> =
        std::mem::take(blocks).into_iter().map(Some).collect();

    for (marker, span) in &plan {
        let mut governed = Vec::with_capacity(span.len());
        for k in span.clone() {
            if let Some(block) = slots[k].take() {
                governed.push(block);
            }
        }
        moved += governed.len();
        if let Some(block) = slots[*marker].as_mut() {
            block.children.extend(governed);
        }
    }

    *blocks = slots.into_iter().flatten().collect();
    moved
}

fn is_marker(block: &IndentBlock) -> bool {
    // Only childless markers open a group; a marker that already has
    // children was grouped on an earlier pass.
    block.children.is_empty() && block.role().is_transition()
}

fn plan_groups(blocks: &[IndentBlock]) -> Vec<(usize, std::ops::Range<usize>)> {
    let mut plan = Vec::new();
    let mut i = 0;
    while i < blocks.len() {
        if !is_marker(&blocks[i]) {
            i += 1;
            continue;
        }
        let mut end = blocks.len();
        for (k, block) in blocks.iter().enumerate().skip(i + 1) {
            // Every transition bounds the span, grouped or not; a
            // marker that already holds children must never be adopted
            // by an earlier zero-scope marker on a rerun.
            if block.role().is_transition() {
                end = k;
                break;
            }
        }
        if end > i + 1 {
            plan.push((i, (i + 1)..end));
        }
        i = end;
    }
    plan
}
