use anyhow::Result;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};
use treescout::{search::run, CrawlConfig, StatsRecord};

fn create_test_files(dir: &Path, files: &[(&str, &str)]) -> Result<()> {
    for (name, content) in files {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
    }
    Ok(())
}

fn crawl(term: &str, workers: &str, roots: &[&Path]) -> Result<(StatsRecord, String)> {
    let config = CrawlConfig::new(
        term,
        workers,
        roots.iter().map(|p| p.to_path_buf()).collect(),
    )?;
    let mut out = Vec::new();
    let stats = run(&config, &mut out)?;
    Ok((stats, String::from_utf8(out)?))
}

/// Single-threaded walk computing the counters a crawl should end with
#[derive(Debug, Default, PartialEq, Eq)]
struct Reference {
    lines: u64,
    line_hits: u64,
    files: u64,
    file_hits: u64,
    dirs: u64,
}

impl Reference {
    fn walk(root: &Path, term: &str) -> Result<Self> {
        let mut reference = Self::default();
        reference.visit(root, term)?;
        Ok(reference)
    }

    fn visit(&mut self, dir: &Path, term: &str) -> Result<()> {
        self.dirs += 1;
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let file_type = fs::symlink_metadata(&path)?.file_type();
            if file_type.is_dir() {
                self.visit(&path, term)?;
            } else if file_type.is_file() {
                self.files += 1;
                let mut hit = false;
                for line in BufReader::new(fs::File::open(&path)?).lines() {
                    self.lines += 1;
                    if line?.contains(term) {
                        self.line_hits += 1;
                        hit = true;
                    }
                }
                if hit {
                    self.file_hits += 1;
                }
            }
        }
        Ok(())
    }

    fn matches(&self, stats: &StatsRecord) -> bool {
        self.lines == stats.lines
            && self.line_hits == stats.line_hits
            && self.files == stats.files
            && self.file_hits == stats.file_hits
            && self.dirs == stats.dirs
    }
}

fn build_mixed_tree() -> Result<TempDir> {
    let dir = tempdir()?;
    let mut files = Vec::new();
    for d in 0..4 {
        for f in 0..6 {
            let mut content = String::new();
            for l in 0..(10 + d * 7 + f) {
                if (l + f) % 5 == 0 && f % 2 == 0 {
                    content.push_str(&format!("line {} FIXME in {}/{}\n", l, d, f));
                } else {
                    content.push_str(&format!("line {} nothing to see\n", l));
                }
            }
            files.push((format!("level1_{}/level2/file_{}.txt", d, f), content));
        }
    }
    let files: Vec<(&str, &str)> = files
        .iter()
        .map(|(name, content)| (name.as_str(), content.as_str()))
        .collect();
    create_test_files(dir.path(), &files)?;
    Ok(dir)
}

/// Splits the reporter output into the individual renderings
fn renderings(output: &str) -> Vec<&str> {
    output
        .split(['\r', '\n'])
        .filter(|segment| !segment.is_empty())
        .collect()
}

fn active_threads(rendering: &str) -> usize {
    rendering
        .rsplit(", ")
        .next()
        .and_then(|tail| tail.strip_suffix(" active threads"))
        .and_then(|n| n.parse().ok())
        .unwrap_or_else(|| panic!("malformed status line: {:?}", rendering))
}

#[test]
fn test_single_matching_line() -> Result<()> {
    let dir = tempdir()?;
    create_test_files(dir.path(), &[("only.txt", "needle\n")])?;

    let (stats, output) = crawl("needle", "4", &[dir.path()])?;
    assert_eq!(stats.dirs, 1);
    assert_eq!(stats.files, 1);
    assert_eq!(stats.file_hits, 1);
    assert_eq!(stats.lines, 1);
    assert_eq!(stats.line_hits, 1);
    assert!(output.ends_with("1/1 lines, 1/1 files, 1 directories, 0 active threads\r\n"));
    Ok(())
}

#[test]
fn test_no_matches() -> Result<()> {
    let dir = tempdir()?;
    create_test_files(
        dir.path(),
        &[
            ("a.txt", "one\ntwo\n"),
            ("b.txt", "three\nfour\nfive\n"),
            ("c.txt", "six\n"),
        ],
    )?;

    let (stats, _) = crawl("needle", "2", &[dir.path()])?;
    assert_eq!(stats.files, 3);
    assert_eq!(stats.file_hits, 0);
    assert_eq!(stats.lines, 6);
    assert_eq!(stats.line_hits, 0);
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_linked_subtree_is_not_counted() -> Result<()> {
    let dir = tempdir()?;
    create_test_files(
        dir.path(),
        &[
            ("a/b/c/deep.txt", "needle here\nplain\n"),
            ("a/b/mid.txt", "plain\n"),
            ("a/top.txt", "needle\n"),
            ("linked/x.txt", "needle\nneedle\nneedle\n"),
            ("linked/y/z.txt", "needle\n"),
        ],
    )?;
    let root = dir.path().join("a");
    std::os::unix::fs::symlink(dir.path().join("linked"), root.join("b/c/shortcut"))?;

    let (stats, _) = crawl("needle", "3", &[root.as_path()])?;
    assert_eq!(stats.dirs, 3);
    assert_eq!(stats.files, 3);
    assert_eq!(stats.file_hits, 2);
    assert_eq!(stats.lines, 4);
    assert_eq!(stats.line_hits, 2);
    assert!(Reference::walk(&root, "needle")?.matches(&stats));
    Ok(())
}

#[test]
fn test_worker_cap_is_respected() -> Result<()> {
    let dir = tempdir()?;
    let content = "filler line\n".repeat(2000);
    let files: Vec<(String, &str)> = (0..10)
        .map(|i| (format!("file_{}.txt", i), content.as_str()))
        .collect();
    let files: Vec<(&str, &str)> = files.iter().map(|(n, c)| (n.as_str(), *c)).collect();
    create_test_files(dir.path(), &files)?;

    let (stats, output) = crawl("needle", "2", &[dir.path()])?;
    assert_eq!(stats.files, 10);
    assert_eq!(stats.lines, 20_000);
    assert!(stats.peak_grep_workers <= 2);
    assert!(renderings(&output)
        .into_iter()
        .all(|rendering| active_threads(rendering) <= 2));
    Ok(())
}

#[test]
fn test_single_worker_serializes_searches() -> Result<()> {
    let tree = build_mixed_tree()?;

    let (stats, output) = crawl("FIXME", "1", &[tree.path()])?;
    assert_eq!(stats.peak_grep_workers, 1);
    assert!(renderings(&output)
        .into_iter()
        .all(|rendering| active_threads(rendering) <= 1));
    Ok(())
}

#[test]
fn test_matches_reference_walk() -> Result<()> {
    let tree = build_mixed_tree()?;
    let reference = Reference::walk(tree.path(), "FIXME")?;

    for workers in ["1", "3", "16"] {
        let (stats, _) = crawl("FIXME", workers, &[tree.path()])?;
        assert!(
            reference.matches(&stats),
            "{:?} != {:?} with {} workers",
            reference,
            stats,
            workers
        );
        assert!(!stats.is_active());
        assert!(stats.is_consistent());
    }
    Ok(())
}

#[test]
fn test_every_rendering_is_consistent() -> Result<()> {
    let tree = build_mixed_tree()?;

    let (_, output) = crawl("FIXME", "4", &[tree.path()])?;
    for rendering in renderings(&output) {
        let numbers: Vec<u64> = rendering
            .split(|c: char| !c.is_ascii_digit())
            .filter(|s| !s.is_empty())
            .map(|s| s.parse().unwrap())
            .collect();
        // line_hits, lines, file_hits, files, dirs, active threads
        assert_eq!(numbers.len(), 6, "{:?}", rendering);
        assert!(numbers[0] <= numbers[1]);
        assert!(numbers[2] <= numbers[3]);
        assert!(numbers[5] <= 4);
    }
    Ok(())
}

#[test]
fn test_parallel_roots_are_summed() -> Result<()> {
    let first = build_mixed_tree()?;
    let second = build_mixed_tree()?;
    let single = Reference::walk(first.path(), "FIXME")?;

    let (stats, _) = crawl("FIXME", "8", &[first.path(), second.path()])?;
    assert_eq!(stats.lines, single.lines * 2);
    assert_eq!(stats.line_hits, single.line_hits * 2);
    assert_eq!(stats.files, single.files * 2);
    assert_eq!(stats.file_hits, single.file_hits * 2);
    assert_eq!(stats.dirs, single.dirs * 2);
    Ok(())
}

#[test]
fn test_empty_directory_terminates() -> Result<()> {
    let dir = tempdir()?;

    let (stats, output) = crawl("anything", "1", &[dir.path()])?;
    assert_eq!(stats.dirs, 1);
    assert_eq!(stats.files, 0);
    assert!(output.ends_with("0/0 lines, 0/0 files, 1 directories, 0 active threads\r\n"));
    assert_eq!(output.matches('\n').count(), 1);
    Ok(())
}

#[test]
fn test_missing_root_fails_the_run() -> Result<()> {
    let dir = tempdir()?;
    let missing: PathBuf = dir.path().join("nope");

    let config = CrawlConfig::new("x", "2", vec![missing])?;
    let mut out = Vec::new();
    assert!(run(&config, &mut out).is_err());
    assert!(out.is_empty());
    Ok(())
}
