//! End-to-end tests for the compara binary
//!
//! These run the built binary against small fixtures and check:
//! - exit codes for success, bad input and a missing subcommand
//! - files written by every subcommand
//! - the JSON run summary on stdout

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const HEADER: &str = "SEQ Species ProteinID Chromosome Start Stop GainLoss GeneID Gene";

/// Two families, both containing ACTB
fn write_dump(dir: &TempDir) -> PathBuf {
    let dump = format!(
        "SEQ homo_sapiens ENSP1 1 100 200 1 ENSG1 ACTB\n\
         SEQ mus_musculus ENSMUSP1 5 300 400 -1 ENSMUSG1 Actb\n\
         {HEADER}\nDATA\n\
         (ENSP1:0.1,ENSMUSP1:0.2);\n\
         //\n\
         SEQ homo_sapiens ENSP2 1 100 200 1 ENSG2 ACTB\n\
         SEQ danio_rerio ENSDARP2 7 10 90 1 ENSDARG2 actba\n\
         {HEADER}\nDATA\n\
         (ENSP2:0.3,ENSDARP2:0.4);\n\
         //\n"
    );
    let path = dir.path().join("families.emf");
    fs::write(&path, dump).expect("Failed to write dump");
    path
}

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("Failed to write fixture");
    path
}

fn read(path: impl AsRef<Path>) -> String {
    fs::read_to_string(path.as_ref())
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.as_ref().display(), e))
}

/// Binary with the compara environment cleared
fn compara() -> Command {
    let mut cmd = Command::cargo_bin("compara").expect("binary should build");
    cmd.env_remove("COMPARA_OUTPUT_DIR")
        .env_remove("COMPARA_SPECIES_FILE")
        .env_remove("COMPARA_PROGRESS_INTERVAL")
        .env_remove("LOG_LEVEL")
        .env_remove("LOG_OUTPUT");
    cmd
}

#[test]
fn test_missing_subcommand_exits_with_usage_code() {
    compara()
        .assert()
        .code(2)
        .stderr(predicate::str::contains("A subcommand is required"));
}

#[test]
fn test_search_writes_chunks() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let dump = write_dump(&dir);
    let out = dir.path().join("out");

    compara()
        .args(["search", "--gene", "actb", "--progress-interval", "1", "-i"])
        .arg(&dump)
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Gene search complete"));

    assert_eq!(
        read(out.join("actb/chunk_1/chunk_1_ProteinID_Newick.tree")),
        "(ENSP1:0.1,ENSMUSP1:0.2);\n"
    );
    assert_eq!(
        read(out.join("actb/chunk_2/chunk_2_GeneName_Newick.tree")),
        "(ACTB:0.3,actba:0.4);\n"
    );
    assert!(out.join("speciesCounts/actb_OrderCounts_chunk_2.txt").is_file());
    assert!(out.join("CumulativeSpeciesCounts.tsv").is_file());
}

#[test]
fn test_search_progress_interval_prints_at_default_log_level() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let dump = write_dump(&dir);

    compara()
        .args(["search", "--gene", "ACTB", "--progress-interval", "1", "-i"])
        .arg(&dump)
        .arg("-o")
        .arg(dir.path().join("out"))
        .assert()
        .success()
        .stderr(predicate::str::contains("-- 1/2 --").and(predicate::str::contains("-- 2/2 --")));
}

#[test]
fn test_search_keeps_first_of_genes_sharing_a_directory() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let dump = write_dump(&dir);
    let out = dir.path().join("out");

    let assert = compara()
        .args(["--format", "json", "search", "--gene", "ACTB", "--gene", "actb"])
        .args(["--gene", "TP 53", "--gene", "tp_53", "--gene", "tp/53"])
        .args(["--progress-interval", "10", "-i"])
        .arg(&dump)
        .arg("-o")
        .arg(&out)
        .assert()
        .success();

    let summary: serde_json::Value =
        serde_json::from_slice(&assert.get_output().stdout).expect("stdout should be JSON");
    let genes = summary["genes"].as_array().expect("genes array");
    let names: Vec<_> = genes.iter().map(|g| g["gene"].as_str().unwrap_or_default()).collect();
    assert_eq!(names, vec!["ACTB", "TP 53"]);
    assert_eq!(genes[0]["emitted"], 2);
    assert!(out.join("ACTB/chunk_2").is_dir());
    assert!(!out.join("actb").exists());
}

#[test]
fn test_search_with_species_from_env_and_json_summary() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let dump = write_dump(&dir);
    let species = write_file(
        &dir,
        "species.tsv",
        "scientific_name\tcommon_name\torder\n\
         homo_sapiens\thuman\tPrimates\n\
         mus_musculus\thouse mouse\tRodentia\n",
    );
    let genes = write_file(&dir, "genes.txt", "ENSG1\tACTB\n");
    let out = dir.path().join("out");

    let assert = compara()
        .env("COMPARA_SPECIES_FILE", &species)
        .env("COMPARA_OUTPUT_DIR", &out)
        .args(["--format", "json", "search", "--progress-interval", "1", "-i"])
        .arg(&dump)
        .arg("-g")
        .arg(&genes)
        .assert()
        .success();

    let summary: serde_json::Value =
        serde_json::from_slice(&assert.get_output().stdout).expect("stdout should be JSON");
    assert_eq!(summary["records"], 2);
    assert_eq!(summary["genes"][0]["gene"], "ACTB");
    assert_eq!(summary["genes"][0]["emitted"], 2);

    assert_eq!(
        read(out.join("ACTB/chunk_1/chunk_1_CommonName_Newick.tree")),
        "(human:0.1,house mouse:0.2);\n"
    );
    // Zebrafish is not of interest, so the second family shrinks to one
    // leaf carrying the root's (absent) branch length
    assert_eq!(
        read(out.join("ACTB/chunk_2/chunk_2_ProteinID_Newick.tree")),
        "ENSP2;\n"
    );
}

#[test]
fn test_search_rejects_short_rows() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let dump = write_file(
        &dir,
        "broken.emf",
        &format!("SEQ homo_sapiens ENSP1 1 100\n{HEADER}\nDATA\n(ENSP1:0.1);\n//\n"),
    );

    compara()
        .args(["search", "--gene", "ACTB", "--progress-interval", "1", "-i"])
        .arg(&dump)
        .arg("-o")
        .arg(dir.path().join("out"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_search_missing_input() {
    let dir = TempDir::new().expect("Failed to create temp dir");

    compara()
        .args(["search", "--gene", "ACTB", "-i"])
        .arg(dir.path().join("nope.emf"))
        .arg("-o")
        .arg(dir.path().join("out"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("nope.emf"));
}

#[test]
fn test_split_writes_one_directory_per_block() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let dump = write_dump(&dir);
    let out = dir.path().join("out");

    compara()
        .args(["split", "-i"])
        .arg(&dump)
        .arg("-o")
        .arg(&out)
        .assert()
        .success();

    let chunk = out.join("fileChunks/chunk_2");
    assert_eq!(read(chunk.join("chunk_2_Newick.tree")), "(ENSP2:0.3,ENSDARP2:0.4);\n");
    assert!(read(chunk.join("chunk_2_SEQ.tsv")).contains("ENSDARP2"));
    assert!(out.join("fileChunks/chunk_1/chunk_1_SEQ.tsv").is_file());
}

#[test]
fn test_count_nodes() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let tree = write_file(&dir, "tree.nh", "((A:1,B:1)ab:1,C:2);\n");
    let out = dir.path().join("counts.nhx");

    compara()
        .args(["count-nodes", "-i"])
        .arg(&tree)
        .arg("-o")
        .arg(&out)
        .assert()
        .success();

    let written = read(&out);
    assert!(written.contains("ab:1[&&NHX:numGenes=2]"));
    assert!(written.ends_with("[&&NHX:numGenes=3];\n"));
}

#[test]
fn test_homology_groups() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let table = write_file(
        &dir,
        "homologies.tsv",
        "gene_stable_id\tprotein_stable_id\tspecies\tidentity\thomology_type\thomology_gene_stable_id\thomology_species\n\
         ENSG1\tENSP1\thomo_sapiens\t90\tortholog_one2one\tENSMUSG1\tmus_musculus\n\
         ENSG1\tENSP1\thomo_sapiens\t40\tortholog_one2one\tENSDARG1\tdanio_rerio\n\
         ENSG2\tENSP2\thomo_sapiens\t70\tortholog_one2many\tENSMUSG2\tmus_musculus\n\
         ENSG3\tENSP3\thomo_sapiens\t99\twithin_species_paralog\tENSG4\thomo_sapiens\n",
    );
    let out = dir.path().join("out");

    let assert = compara()
        .args(["--format", "json", "homology", "-i"])
        .arg(&table)
        .arg("-o")
        .arg(&out)
        .assert()
        .success();

    let summary: serde_json::Value =
        serde_json::from_slice(&assert.get_output().stdout).expect("stdout should be JSON");
    assert_eq!(summary["initial"], 4);
    assert_eq!(summary["remaining"], 2);
    assert_eq!(summary["genes"], 2);

    let groups = read(out.join("homology_groups.tsv"));
    assert_eq!(groups.lines().count(), 3);
    assert!(groups.contains("ENSG1\t1\t1\t0\tmus_musculus"));
}

#[test]
fn test_variants_and_no_results() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let fasta = write_file(
        &dir,
        "aln.fa",
        ">human\nMKVL\n>mouse\nMKVL\n>rat\nMRVL\n>primate_gorilla\nMKVI\n",
    );
    let out = dir.path().join("variants.tsv");

    compara()
        .args(["variants", "-i"])
        .arg(&fasta)
        .arg("-o")
        .arg(&out)
        .assert()
        .success();
    let hits = read(&out);
    assert!(hits.starts_with("seqName\tposition\tuniqueAA\tallSampleBases\n"));
    assert!(hits.contains("rat\t1\tR\tKKRK"));
    assert!(!hits.contains("primate_gorilla"));

    compara()
        .args(["variants", "--keep-all", "-i"])
        .arg(&fasta)
        .arg("-o")
        .arg(&out)
        .assert()
        .success();
    assert!(read(&out).contains("primate_gorilla\t3\tI\tLLLI"));

    let same = write_file(&dir, "same.fa", ">a\nMKVL\n>b\nMKVL\n>c\nMKVL\n");
    compara()
        .args(["variants", "-i"])
        .arg(&same)
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("No single-sample variants found"));
    assert!(dir.path().join("variants_NO_RESULTS.tsv").is_file());
}
