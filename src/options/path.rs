// Nested path addressing for option maps
//
// A key such as `database.host` addresses the `host` entry of the map stored
// under `database`. A literal key containing the separator always wins over
// the nested reading. Numeric segments index into lists.

use indexmap::IndexMap;

use crate::options::value::OptionValue;

/// Ordered map of option keys to values.
pub type OptionMap = IndexMap<String, OptionValue>;

/// Returns true if `key` resolves to an entry, even one holding null.
pub fn has(map: &OptionMap, key: &str, separator: Option<char>) -> bool {
    lookup(map, key, separator).is_some()
}

/// Resolves `key` to the value it addresses.
pub fn lookup<'a>(map: &'a OptionMap, key: &str, separator: Option<char>) -> Option<&'a OptionValue> {
    if let Some(value) = map.get(key) {
        return Some(value);
    }

    let separator = separator?;
    if !key.contains(separator) {
        return None;
    }

    let mut segments = key.split(separator);
    let mut current = map.get(segments.next()?)?;
    for segment in segments {
        current = child(current, segment)?;
    }
    Some(current)
}

/// Writes `value` at `key`, creating intermediate maps as needed.
///
/// A literal key already holding the separator is overwritten in place.
/// Lists accept in-range indexes and an append at their length; any other
/// segment turns the list into a map keyed by position. Intermediate
/// scalars are replaced by empty maps.
pub fn set(map: &mut OptionMap, key: &str, value: OptionValue, separator: Option<char>) {
    if map.contains_key(key) {
        map.insert(key.to_string(), value);
        return;
    }

    let segments: Vec<&str> = match separator {
        Some(sep) => key.split(sep).collect(),
        None => vec![key],
    };

    match segments.split_first() {
        Some((head, [])) => {
            map.insert(head.to_string(), value);
        }
        Some((head, rest)) => {
            let slot = map.entry(head.to_string()).or_insert(OptionValue::Null);
            set_in(slot, rest, value);
        }
        None => {}
    }
}

/// Removes the entry at `key`, returning it if it existed.
pub fn forget(map: &mut OptionMap, key: &str, separator: Option<char>) -> Option<OptionValue> {
    if map.contains_key(key) {
        return map.shift_remove(key);
    }

    let separator = separator?;
    let (parent_path, last) = key.rsplit_once(separator)?;
    match lookup_mut(map, parent_path, separator)? {
        OptionValue::Map(parent) => parent.shift_remove(last),
        OptionValue::Array(items) => {
            let index = last.parse::<usize>().ok()?;
            (index < items.len()).then(|| items.remove(index))
        }
        _ => None,
    }
}

fn set_in(slot: &mut OptionValue, segments: &[&str], value: OptionValue) {
    let Some((head, rest)) = segments.split_first() else {
        return;
    };

    let mut positional = None;
    if let OptionValue::Array(items) = slot {
        match head.parse::<usize>() {
            Ok(index) if index < items.len() => {
                let item = &mut items[index];
                if rest.is_empty() {
                    *item = value;
                } else {
                    set_in(item, rest, value);
                }
                return;
            }
            Ok(index) if index == items.len() => {
                if rest.is_empty() {
                    items.push(value);
                } else {
                    items.push(OptionValue::Null);
                    if let Some(item) = items.last_mut() {
                        set_in(item, rest, value);
                    }
                }
                return;
            }
            // Keep the elements under their positions.
            _ => {
                positional = Some(
                    std::mem::take(items)
                        .into_iter()
                        .enumerate()
                        .map(|(i, item)| (i.to_string(), item))
                        .collect::<OptionMap>(),
                );
            }
        }
    }
    if let Some(entries) = positional {
        *slot = OptionValue::Map(entries);
    }

    if !matches!(slot, OptionValue::Map(_)) {
        *slot = OptionValue::Map(OptionMap::new());
    }

    if let OptionValue::Map(map) = slot {
        if rest.is_empty() {
            map.insert(head.to_string(), value);
        } else {
            let child = map.entry(head.to_string()).or_insert(OptionValue::Null);
            set_in(child, rest, value);
        }
    }
}

fn lookup_mut<'a>(map: &'a mut OptionMap, path: &str, separator: char) -> Option<&'a mut OptionValue> {
    if map.contains_key(path) {
        return map.get_mut(path);
    }

    let mut segments = path.split(separator);
    let mut current = map.get_mut(segments.next()?)?;
    for segment in segments {
        current = child_mut(current, segment)?;
    }
    Some(current)
}

fn child<'a>(value: &'a OptionValue, segment: &str) -> Option<&'a OptionValue> {
    match value {
        OptionValue::Map(map) => map.get(segment),
        OptionValue::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn child_mut<'a>(value: &'a mut OptionValue, segment: &str) -> Option<&'a mut OptionValue> {
    match value {
        OptionValue::Map(map) => map.get_mut(segment),
        OptionValue::Array(items) => segment
            .parse::<usize>()
            .ok()
            .and_then(move |i| items.get_mut(i)),
        _ => None,
    }
}
