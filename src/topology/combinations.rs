use crate::sonos::Speaker;
use std::fmt;

/// Largest subset size enumerated exhaustively. Beyond it only the full fleet is offered.
pub const MAX_ENUMERATED_SIZE: usize = 3;

/// A candidate set of speakers to group, in fleet order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Combination(Vec<Speaker>);

impl Combination {
    pub fn speakers(&self) -> &[Speaker] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(|s| s.room_name()).collect();
        f.write_str(&names.join(" + "))
    }
}

/// Enumerates the groupable subsets of `speakers`.
///
/// Singles, then pairs, then triples, each in lexicographic order of input
/// indices, then the whole fleet when it has at least four speakers. Other
/// subsets larger than three are never produced.
pub fn generate(speakers: &[Speaker]) -> Vec<Combination> {
    let n = speakers.len();
    let mut combinations = Vec::with_capacity(expected_count(n));

    for size in 1..=MAX_ENUMERATED_SIZE.min(n) {
        let mut indices: Vec<usize> = (0..size).collect();
        loop {
            combinations.push(Combination(
                indices.iter().map(|&i| speakers[i].clone()).collect(),
            ));
            if !advance(&mut indices, n) {
                break;
            }
        }
    }

    if n > MAX_ENUMERATED_SIZE {
        combinations.push(Combination(speakers.to_vec()));
    }

    combinations
}

/// Steps `indices` to the next strictly increasing tuple below `n`.
fn advance(indices: &mut [usize], n: usize) -> bool {
    let k = indices.len();
    for pos in (0..k).rev() {
        if indices[pos] < n - k + pos {
            indices[pos] += 1;
            for next in pos + 1..k {
                indices[next] = indices[next - 1] + 1;
            }
            return true;
        }
    }
    false
}

/// `n + C(n,2) + C(n,3)`, plus one for the full fleet when `n >= 4`.
pub fn expected_count(n: usize) -> usize {
    let pairs = n * n.saturating_sub(1) / 2;
    let triples = n * n.saturating_sub(1) * n.saturating_sub(2) / 6;
    n + pairs + triples + usize::from(n > MAX_ENUMERATED_SIZE)
}
