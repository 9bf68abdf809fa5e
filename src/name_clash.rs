//! Sibling name de-duplication over a finished document tree.
//!
//! Nodes are grouped by `(name, parent id)`. The first node of each group keeps its name, every
//! later one gets `"{name}-#{i}"`, or `"{name}-#{i}({token})"` when that alias is already taken
//! under the same parent. Only `name_clash` and `unique_name` are ever touched.

use crate::document::JsonGameObject;
use crate::res_id::ResId;

use hashbrown::{HashMap as FastMap, HashSet as FastSet};
use log::{debug, error};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct NameClashKey {
    name: String,
    parent: ResId,
}

/// 32 lowercase hex digits.
pub fn random_token() -> String {
    Uuid::new_v4().simple().to_string()
}

pub fn fix_name_clashes(objects: &mut [JsonGameObject]) {
    fix_name_clashes_with(objects, random_token)
}

/// Like [`fix_name_clashes`], drawing fallback tokens from `new_token`.
///
/// `new_token` is called until the resulting alias is free, so it must eventually produce a
/// token that has not been used under the same parent.
pub fn fix_name_clashes_with<F>(objects: &mut [JsonGameObject], mut new_token: F)
where
    F: FnMut() -> String,
{
    let positions: FastMap<ResId, usize, ahash::RandomState> = {
        let mut map = FastMap::with_hasher(ahash::RandomState::new());
        for (pos, obj) in objects.iter().enumerate().filter(|(_, o)| o.id.is_valid()) {
            map.insert(obj.id, pos);
        }
        map
    };

    // Groups in first-seen order.
    let mut group_index: FastMap<NameClashKey, usize, ahash::RandomState> =
        FastMap::with_hasher(ahash::RandomState::new());
    let mut groups: Vec<(NameClashKey, Vec<ResId>)> = Vec::new();
    for obj in objects.iter() {
        let key = NameClashKey {
            name: obj.name.clone(),
            parent: obj.parent,
        };
        match group_index.get(&key) {
            Some(&idx) => groups[idx].1.push(obj.id),
            None => {
                group_index.insert(key.clone(), groups.len());
                groups.push((key, vec![obj.id]));
            }
        }
    }

    let mut taken: FastSet<NameClashKey, ahash::RandomState> =
        FastSet::with_hasher(ahash::RandomState::new());
    taken.extend(group_index.into_keys());

    for (key, ids) in &groups {
        if ids.len() <= 1 {
            continue;
        }

        for (i, &id) in ids.iter().enumerate().skip(1) {
            let Some(&pos) = positions.get(&id) else {
                error!(
                    "Invalid object id {}, while processing name clash {};\"{}\"",
                    id, key.parent, key.name
                );
                continue;
            };

            let mut alias = NameClashKey {
                name: format!("{}-#{}", key.name, i),
                parent: key.parent,
            };
            while taken.contains(&alias) {
                alias.name = format!("{}-#{}({})", key.name, i, new_token());
            }
            debug!("Renaming clashing `{}` (id {}) to `{}`", key.name, id, alias.name);

            let obj = &mut objects[pos];
            obj.name_clash = true;
            obj.unique_name = alias.name.clone();
            taken.insert(alias);
        }
    }
}
