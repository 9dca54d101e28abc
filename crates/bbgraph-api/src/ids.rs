use async_graphql::ID;
use bbgraph_types::models::PostId;

/// Reads a GraphQL id the forgiving way: sign is dropped and anything that is
/// not a number becomes zero.
pub fn absint(raw: &str) -> i64 {
    raw.trim().parse::<i64>().map(i64::unsigned_abs).map_or(0, |n| n.min(i64::MAX as u64) as i64)
}

/// A usable post id, or `None` for zero and garbage.
pub fn post_id(id: &ID) -> Option<PostId> {
    match absint(id) {
        0 => None,
        n => Some(n),
    }
}

pub fn to_id(id: PostId) -> ID {
    ID(id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absint_drops_sign_and_garbage() {
        assert_eq!(absint("42"), 42);
        assert_eq!(absint(" -7 "), 7);
        assert_eq!(absint("abc"), 0);
        assert_eq!(absint(""), 0);
    }

    #[test]
    fn zero_is_not_an_id() {
        assert_eq!(post_id(&ID::from("0")), None);
        assert_eq!(post_id(&ID::from("15")), Some(15));
    }
}
