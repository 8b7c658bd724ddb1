//! Message ID generation.
//!
//! IDs are not content-addressed. The default format is
//! `msg_<base36 millis>_<9 random base36 chars>`; a collision with an ID
//! already seen is reported as a duplicate publish.

use rand::Rng;

use meshsync_core::MessageId;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const RANDOM_SUFFIX_LEN: usize = 9;

/// Produces IDs for messages originated on this node.
pub trait MessageIdSource: Send + Sync {
    fn next_id(&self, now_millis: i64) -> MessageId;
}

/// Timestamp plus random suffix.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomMessageIds;

impl MessageIdSource for RandomMessageIds {
    fn next_id(&self, now_millis: i64) -> MessageId {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..RANDOM_SUFFIX_LEN)
            .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
            .collect();
        MessageId::new(format!("msg_{}_{}", to_base36(now_millis.max(0) as u64), suffix))
    }
}

fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(1_700_000_000_000), "loyw3v28");
    }

    #[test]
    fn test_random_id_shape() {
        let id = RandomMessageIds.next_id(36);
        let parts: Vec<_> = id.as_str().split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "msg");
        assert_eq!(parts[1], "10");
        assert_eq!(parts[2].len(), RANDOM_SUFFIX_LEN);
        assert!(parts[2].bytes().all(|b| BASE36.contains(&b)));
    }

    #[test]
    fn test_random_ids_differ() {
        assert_ne!(RandomMessageIds.next_id(1), RandomMessageIds.next_id(1));
    }
}
