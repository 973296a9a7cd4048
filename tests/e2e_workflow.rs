//! End-to-end workflow over a source directory
//!
//! 1. Discover sources
//! 2. Apply a batch of requests
//! 3. Diff, then save
//! 4. Write-through mode commits every edit immediately

use std::fs;
use tempfile::TempDir;
use tune_patcher::config::{self, SourceSettings};
use tune_patcher::{BatchSummary, Mode, Repository, Rounding, SourceError, Tuner, WriteMode};

const TYPES_H: &str = "\
#ifndef TYPES_H
#define TYPES_H

enum PieceType {
  NO_PIECE_TYPE, PAWN, KNIGHT, BISHOP, ROOK, QUEEN, KING,
  ALL_PIECES = 0,
  PIECE_TYPE_NB = 8
};

enum Depth : int {
  ONE_PLY = 1,
  DEPTH_ZERO = 0
};

#endif
";

const EVALUATE_CPP: &str = "\
#include \"types.h\"

namespace {

  // Bonus for each piece type, indexed by [phase][piece]
  constexpr Score PieceBonus[2][4] = {
    { S( 0, 0), S(10, 12), S(20, 25), S(30, 33) },
    { S( 0, 0), S(11, 14), S(21, 26), S(31, 35) }
  };

  const int KingSafety[3] = { 5, 40, 120 };

  int Tempo = 28;

  const int Reductions[2] = { 1, ONE_PLY };

} // namespace
";

fn setup_sources() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("types.h"), TYPES_H).unwrap();
    fs::write(dir.path().join("evaluate.cpp"), EVALUATE_CPP).unwrap();
    fs::write(dir.path().join("notes.txt"), "int Tempo = 1;\n").unwrap();
    fs::create_dir(dir.path().join("nnue")).unwrap();
    fs::write(dir.path().join("nnue/layers.h"), "int Hidden = 3;\n").unwrap();
    dir
}

fn open(dir: &TempDir, mode: WriteMode) -> Repository {
    Repository::open(dir.path(), mode, &SourceSettings::default()).unwrap()
}

fn read(dir: &TempDir, name: &str) -> String {
    fs::read_to_string(dir.path().join(name)).unwrap()
}

#[test]
fn discovers_recognized_sources_only() {
    let dir = setup_sources();
    let repo = open(&dir, WriteMode::InMemory);

    let names: Vec<_> = repo
        .units()
        .iter()
        .map(|u| u.path().file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["evaluate.cpp", "types.h"]);

    let recursive = SourceSettings {
        recursive: true,
        ..SourceSettings::default()
    };
    let repo = Repository::open(dir.path(), WriteMode::InMemory, &recursive).unwrap();
    assert_eq!(repo.len(), 3);
}

#[test]
fn missing_directory_is_an_error() {
    let dir = TempDir::new().unwrap();
    let err = Repository::open(
        dir.path().join("absent"),
        WriteMode::InMemory,
        &SourceSettings::default(),
    )
    .unwrap_err();
    assert!(matches!(err, SourceError::MissingDirectory(_)));
}

#[test]
fn spsa_batch_then_save() {
    let dir = setup_sources();
    let mut tuner = Tuner::new(
        open(&dir, WriteMode::InMemory),
        config::TunerConfig::default(),
        Rounding::Round,
    );

    let summary = tuner.run(
        Mode::Spsa,
        [
            "param: mPieceBonus[1][KNIGHT], best: 23.4, start: 21.0",
            "param: ePieceBonus[0][PAWN], best: 9.5, start: 12.0",
            "param: KingSafety[2], best: 118.2, start: 120",
            "param: Tempo, best: 31, start: 28",
            "param: Reductions[1], best: 2, start: 1",
            "param: Nonexistent[0], best: 1, start: 1",
        ],
    );
    assert_eq!(
        summary,
        BatchSummary {
            applied: 5,
            invalid: 0,
            failed: 1,
        }
    );

    let repo = tuner.into_repository();

    // Nothing on disk until saved
    assert_eq!(read(&dir, "evaluate.cpp"), EVALUATE_CPP);
    let diff = repo.diff().unwrap();
    assert!(diff.contains("-  const int KingSafety[3] = { 5, 40, 120 };"));
    assert!(diff.contains("+  const int KingSafety[3] = { 5, 40, 118 };"));
    assert!(diff.contains("-  ONE_PLY = 1,"));

    assert_eq!(repo.save().unwrap(), 2);

    let evaluate = read(&dir, "evaluate.cpp");
    assert!(evaluate.contains("{ S( 0, 0), S(10, 10), S(20, 25), S(30, 33) },"));
    assert!(evaluate.contains("{ S( 0, 0), S(11, 14), S(23, 26), S(31, 35) }"));
    assert!(evaluate.contains("int Tempo = 31;"));
    assert!(evaluate.contains("const int Reductions[2] = { 1, ONE_PLY };"));
    assert!(read(&dir, "types.h").contains("  ONE_PLY = 2,"));

    // Saved content is now the baseline of a fresh load
    let reloaded = open(&dir, WriteMode::InMemory);
    assert_eq!(reloaded.diff().unwrap(), "");
}

#[test]
fn function_and_align_modes() {
    let dir = setup_sources();
    let mut tuner = Tuner::new(
        open(&dir, WriteMode::InMemory),
        config::TunerConfig::default(),
        Rounding::Round,
    );

    let summary = tuner.run(Mode::Function, ["KingSafety ; x * 10"]);
    assert_eq!(summary.applied, 1);
    let summary = tuner.run(Mode::Align, ["PieceBonus", "KingSafety"]);
    assert_eq!(summary.applied, 2);

    tuner.into_repository().save().unwrap();
    let evaluate = read(&dir, "evaluate.cpp");
    assert!(evaluate.contains("const int KingSafety[3] = { 50, 400, 1200 };"));
    assert!(evaluate.contains("// Bonus for each piece type"));
}

#[test]
fn write_through_commits_each_edit() {
    let dir = setup_sources();
    let mut tuner = Tuner::new(
        open(&dir, WriteMode::WriteThrough),
        config::TunerConfig::default(),
        Rounding::Floor,
    );

    let summary = tuner.run(Mode::Spsa, ["param: Tempo, best: 30.9, start: 28"]);
    assert_eq!(summary.applied, 1);
    assert!(read(&dir, "evaluate.cpp").contains("int Tempo = 30;"));

    let repo = tuner.into_repository();
    assert!(matches!(
        repo.diff().unwrap_err(),
        SourceError::NotInMemory { .. }
    ));
    assert_eq!(repo.save().unwrap(), 0);
}
