use std::hash::Hash;

use hashbrown::HashMap;

// hashbrown iteration order varies between runs; anything that feeds the
// random number generator or the output must go through this instead.
pub fn sorted_hashmap_iter<T, U>(hashmap: &HashMap<T, U>) -> impl Iterator<Item = (&T, &U)>
where
    T: Ord + Hash,
{
    let mut keys: Vec<&T> = hashmap.keys().collect();
    keys.sort();
    keys.into_iter().map(|k| (k, &hashmap[k]))
}
