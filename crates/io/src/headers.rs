// Header row normalization
//
// Blank header cells become `Unnamed: {index}` and repeated names get `.1`,
// `.2`, ... suffixes, so every table has unique column names.

use rustc_hash::FxHashSet;

pub fn normalize_headers(raw: Vec<String>) -> Vec<String> {
    let named: Vec<String> = raw
        .into_iter()
        .enumerate()
        .map(|(i, name)| if name.is_empty() { format!("Unnamed: {i}") } else { name })
        .collect();

    let mut taken: FxHashSet<String> = FxHashSet::default();
    let mut out = Vec::with_capacity(named.len());
    for name in named {
        let unique = if taken.contains(&name) {
            (1..)
                .map(|n| format!("{name}.{n}"))
                .find(|candidate| !taken.contains(candidate))
                .unwrap_or_default()
        } else {
            name
        };
        taken.insert(unique.clone());
        out.push(unique);
    }
    out
}
