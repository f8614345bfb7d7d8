use mosx_evaluate::histogram;
use mosx_model::LearningCurve;
use mosx_plot::{
    Color, Figure, Panel, PlotError, Series, error_distribution_figure, learning_curve_figure,
    rank_histogram_figure, render_pdf,
};

fn assert_pdf(path: &std::path::Path) {
    let bytes = std::fs::read(path).unwrap();
    assert!(bytes.len() > 100);
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn test_learning_curve_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("learning_curve.pdf");
    let curve = LearningCurve {
        train_sizes: vec![6, 20, 33, 47, 60],
        train_scores: vec![-2.0, -3.1, -3.5, -3.8, -4.0],
        test_scores: vec![-12.0, -8.0, -6.5, -6.0, -5.8],
    };
    render_pdf(&learning_curve_figure(&curve).unwrap(), &path).unwrap();
    assert_pdf(&path);
}

#[test]
fn test_four_panel_pdfs() {
    let dir = tempfile::tempdir().unwrap();

    let ranks = vec![vec![3, 1, 4, 1, 5, 9]; 4];
    let rank_path = dir.path().join("rank_histogram.pdf");
    render_pdf(&rank_histogram_figure(&ranks).unwrap(), &rank_path).unwrap();
    assert_pdf(&rank_path);

    let errors: Vec<f64> = (0..50).map(|i| ((i * 37) % 11) as f64 - 5.0).collect();
    let hists = vec![histogram(&errors, 10); 4];
    let err_path = dir.path().join("error_distribution.pdf");
    render_pdf(&error_distribution_figure(&hists).unwrap(), &err_path).unwrap();
    assert_pdf(&err_path);
}

#[test]
fn test_nan_points_do_not_break_rendering() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nan.pdf");
    let panel = Panel::new("gaps", "x", "y").with_series(Series::Line {
        points: vec![(0.0, 1.0), (1.0, f64::NAN), (2.0, 3.0), (3.0, 2.0)],
        color: Color::BLUE,
        label: Some("series".to_string()),
    });
    render_pdf(&Figure::new("gaps", 1).with_panel(panel), &path).unwrap();
    assert_pdf(&path);
}

#[test]
fn test_empty_figure_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.pdf");
    let err = render_pdf(&Figure::new("empty", 1), &path).unwrap_err();
    assert!(matches!(err, PlotError::EmptyData { .. }));
    assert!(!path.exists());
}

#[test]
fn test_unwritable_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("out.pdf");
    let fig = rank_histogram_figure(&[vec![1, 2]]).unwrap();
    assert!(matches!(render_pdf(&fig, &path), Err(PlotError::Io { .. })));
}
