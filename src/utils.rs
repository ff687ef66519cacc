use rand::Rng;

/// Picks one element uniformly at random.
///
/// # Parameters
/// - `items`: The candidates.
/// - `rng`: The random source. Passing a seeded generator makes the choice
///          reproducible.
///
/// # Returns
/// A reference to the chosen element, or `None` if `items` is empty.
pub fn random_choice<'a, T, R: Rng>(items: &'a [T], rng: &mut R) -> Option<&'a T>{
    if items.is_empty(){
        None
    }
    else{
        Some(&items[rng.random_range(0..items.len())])
    }
}

/// Returns the first element with the greatest key.
///
/// Unlike `Iterator::max_by`, which keeps the last of several equal maxima,
/// an element only replaces the current best when its key is strictly
/// greater. Elements with a `NaN` key are skipped.
///
/// # Returns
/// `None` if the iterator is empty or every key is `NaN`.
pub fn max_element_by<I, F>(items: I, mut key: F) -> Option<I::Item>
where
    I: IntoIterator,
    F: FnMut(&I::Item) -> f64
{
    let mut best: Option<(I::Item, f64)> = None;

    for item in items{
        let value = key(&item);
        if value.is_nan(){
            continue;
        }

        let replace = match &best{
            Some((_, best_value)) => value > *best_value,
            None => true
        };

        if replace{
            best = Some((item, value));
        }
    }

    best.map(|(item, _)| item)
}
