//! Feature Extraction
//!
//! Hashing vectorizer over the text of a bug. Must match the one used at
//! training time: same tokens, CRC32 buckets, L2-normalized rows.

use ndarray::Array2;

use crate::logic::bugzilla::Bug;

/// Shortest token kept
const MIN_TOKEN_LEN: usize = 2;

/// Lowercase alphanumeric tokens of `text`
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= MIN_TOKEN_LEN)
        .map(str::to_lowercase)
}

/// All tokens describing one bug
pub fn bug_tokens(bug: &Bug) -> Vec<String> {
    let mut tokens: Vec<String> = tokenize(&bug.summary)
        .chain(tokenize(&bug.description))
        .collect();

    tokens.extend(bug.keywords.iter().map(|k| format!("kw:{}", k.to_lowercase())));
    if !bug.product.is_empty() {
        tokens.push(format!(
            "pc:{}::{}",
            bug.product.to_lowercase(),
            bug.component.to_lowercase()
        ));
    }
    tokens
}

fn bucket(token: &str, n_features: usize) -> usize {
    crc32fast::hash(token.as_bytes()) as usize % n_features
}

/// One row per bug, `n_features` columns
pub fn featurize(bugs: &[Bug], n_features: usize) -> Array2<f32> {
    let mut matrix = Array2::<f32>::zeros((bugs.len(), n_features));
    if n_features == 0 {
        return matrix;
    }

    for (mut row, bug) in matrix.rows_mut().into_iter().zip(bugs) {
        for token in bug_tokens(bug) {
            row[bucket(&token, n_features)] += 1.0;
        }

        let norm = row.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            row.mapv_inplace(|v| v / norm);
        }
    }

    matrix
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bug(summary: &str) -> Bug {
        Bug {
            id: 1,
            summary: summary.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_tokenize() {
        let tokens: Vec<String> = tokenize("Crash in nsFoo::Bar() on a x86_64 box").collect();
        assert_eq!(tokens, vec!["crash", "in", "nsfoo", "bar", "on", "x86", "64", "box"]);
    }

    #[test]
    fn test_bug_tokens_include_metadata() {
        let bug = Bug {
            product: "Core".to_string(),
            component: "DOM: Events".to_string(),
            keywords: vec!["Regression".to_string()],
            ..bug("Click broken")
        };
        let tokens = bug_tokens(&bug);

        assert!(tokens.contains(&"click".to_string()));
        assert!(tokens.contains(&"kw:regression".to_string()));
        assert!(tokens.contains(&"pc:core::dom: events".to_string()));
    }

    #[test]
    fn test_rows_are_normalized() {
        let bugs = vec![bug("crash crash on startup"), bug("")];
        let matrix = featurize(&bugs, 64);

        assert_eq!(matrix.dim(), (2, 64));
        let norm: f32 = matrix.row(0).iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
        assert!(matrix.row(1).iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_same_text_same_features() {
        let matrix = featurize(&[bug("add dark mode"), bug("add dark mode")], 128);
        assert_eq!(matrix.row(0), matrix.row(1));
    }
}
