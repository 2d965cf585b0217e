use std::path::PathBuf;

use lu_decomp::matrix::{RANDOM_MAX, RANDOM_MIN};
use lu_decomp::{serial, Error, Matrix};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("lu-decomp-{}-{}.txt", std::process::id(), name))
}

#[test]
fn test_parse_infers_size_from_first_line() {
    let m = Matrix::parse("1 2 3\n4 5 3\n1 2 6\n").unwrap();
    assert_eq!(m.rows(), 3);
    assert_eq!(m.cols(), 3);
    assert_eq!(m.row(1), &[4.0, 5.0, 3.0]);
    assert_eq!(m[(2, 2)], 6.0);
}

#[test]
fn test_parse_ignores_lines_past_the_matrix() {
    let m = Matrix::parse("1 2\n3 4\n5 6\n").unwrap();
    assert_eq!(m, Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap());
}

#[test]
fn test_parse_reports_bad_token() {
    let err = Matrix::parse("1 2\n3 x\n").unwrap_err();
    match err {
        Error::Parse { line, token } => {
            assert_eq!(line, 2);
            assert_eq!(token, "x");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_parse_reports_ragged_row() {
    let err = Matrix::parse("1 2 3\n4 5\n6 7 8\n").unwrap_err();
    assert!(matches!(
        err,
        Error::Ragged {
            line: 2,
            expected: 3,
            got: 2
        }
    ));
}

#[test]
fn test_short_file_yields_non_square_matrix() {
    let mut m = Matrix::parse("1 2 3\n4 5 6\n").unwrap();
    assert_eq!((m.rows(), m.cols()), (2, 3));
    assert!(!m.is_square());
    assert!(matches!(
        serial::eliminate(&mut m),
        Err(Error::NotSquare { rows: 2, cols: 3 })
    ));
}

#[test]
fn test_empty_text_is_empty_matrix() {
    let m = Matrix::parse("").unwrap();
    assert!(m.is_empty());
    assert_eq!(m.rows(), 0);
}

#[test]
fn test_from_rows_rejects_ragged_input() {
    let err = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).unwrap_err();
    assert!(matches!(
        err,
        Error::Ragged {
            line: 2,
            expected: 2,
            got: 1
        }
    ));
}

#[test]
fn test_random_entries_stay_in_range() {
    let mut rng = StdRng::seed_from_u64(3);
    let m = Matrix::random(20, &mut rng);
    assert_eq!(m.len(), 400);
    assert!(m
        .as_slice()
        .iter()
        .all(|v| (RANDOM_MIN..=RANDOM_MAX).contains(v)));
}

#[tokio::test]
async fn test_save_then_load_round_trips() {
    let mut rng = StdRng::seed_from_u64(4);
    let m = Matrix::random(12, &mut rng);
    let path = temp_path("round-trip");

    m.save(&path).await.unwrap();
    let loaded = Matrix::load(&path).await.unwrap();
    tokio::fs::remove_file(&path).await.unwrap();

    assert_eq!(loaded, m);
}

#[tokio::test]
async fn test_load_missing_file_is_io_error() {
    let err = Matrix::load(temp_path("does-not-exist")).await.unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn test_text_format_is_space_separated_rows() {
    let m = Matrix::from_rows(vec![vec![1.5, -2.0], vec![0.25, 3.0]]).unwrap();
    assert_eq!(m.to_text(), "1.5 -2\n0.25 3\n");
}

#[test]
fn test_display_uses_fixed_width_columns() {
    let m = Matrix::from_rows(vec![vec![1.0, -0.5]]).unwrap();
    assert_eq!(
        m.to_string(),
        "  1.00000000000000  -0.50000000000000\n"
    );
}

#[test]
fn test_multiply_checks_dimensions() {
    let a = Matrix::zeros(2, 3);
    let b = Matrix::zeros(2, 3);
    assert!(matches!(
        a.multiply(&b),
        Err(Error::DimensionMismatch(2, 3, 2, 3))
    ));
    assert_eq!(Matrix::identity(3).multiply(&Matrix::identity(3)).unwrap(), Matrix::identity(3));
}
