use crate::model::Listing;
use std::collections::HashMap;

/// Buckets listings by `base_product_id` and keeps the buckets that hold more
/// than one listing. Bucket order and order inside a bucket follow the input.
pub fn group_by_base_id(listings: &[Listing]) -> Vec<Vec<Listing>> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut buckets: Vec<Vec<Listing>> = Vec::new();

    for listing in listings {
        let key = listing.base_product_id.as_str();
        let slot = *index.entry(key).or_insert_with(|| {
            buckets.push(Vec::new());
            buckets.len() - 1
        });
        buckets[slot].push(listing.clone());
    }

    buckets.into_iter().filter(|group| group.len() > 1).collect()
}
