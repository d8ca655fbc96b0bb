use crate::regions::{RegionGraph, RegionIdx};
use anyhow::{bail, Result};
use gw2rando_logic::{CollectionState, Logic};
use std::collections::VecDeque;

// Breadth-first search from the menu region. Rules are monotone in the
// collected items, so one pass over a fixed state is enough.
pub fn get_reachable_regions<S: CollectionState + ?Sized>(
    graph: &RegionGraph,
    logic: &Logic,
    state: &S,
) -> Vec<bool> {
    let mut reachable = vec![false; graph.regions.len()];
    if graph.regions.is_empty() {
        return reachable;
    }
    let mut queue: VecDeque<RegionIdx> = VecDeque::new();
    reachable[0] = true;
    queue.push_back(0);
    while let Some(region_idx) = queue.pop_front() {
        for exit in &graph.regions[region_idx].exits {
            if !reachable[exit.to] && logic.evaluate(&exit.rule, state) {
                reachable[exit.to] = true;
                queue.push_back(exit.to);
            }
        }
    }
    reachable
}

pub fn verify_reachability<S: CollectionState + ?Sized>(
    graph: &RegionGraph,
    logic: &Logic,
    state: &S,
) -> Result<()> {
    let reachable = get_reachable_regions(graph, logic, state);
    let unreachable: Vec<&str> = graph
        .regions
        .iter()
        .zip(reachable.iter())
        .filter(|(_, &r)| !r)
        .map(|(region, _)| region.name.as_str())
        .collect();
    if !unreachable.is_empty() {
        bail!(
            "Regions not reachable with every item collected: {}",
            unreachable.join(", ")
        );
    }
    Ok(())
}
