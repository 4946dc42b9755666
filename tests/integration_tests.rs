//! Integration tests for voyage-batch
//!
//! Each test builds its own scratch folders with tempfile and drives the
//! library entry points the binaries use.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::tempdir;
use voyage_batch::config::{ExtractConfig, MergeConfig, PipelineArgs, PipelineConfig, SplitConfig};
use voyage_batch::extract::ExtractCoordinator;
use voyage_batch::merge::merge_directory;
use voyage_batch::split::split_by_key;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

fn write_zip(path: &Path, members: &[(&str, String)]) {
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    for (name, body) in members {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

fn read_csv(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let mut reader = csv::Reader::from_path(path).unwrap();
    let headers = reader.headers().unwrap().iter().map(String::from).collect();
    let rows = reader
        .records()
        .map(|r| r.unwrap().iter().map(String::from).collect())
        .collect();
    (headers, rows)
}

#[test]
fn test_pipeline_skips_corrupt_archive() {
    let dir = tempdir().unwrap();
    let zips = dir.path().join("zip");
    let out = dir.path().join("unzipped");
    let merged = dir.path().join("merged_output.csv");
    fs::create_dir(&zips).unwrap();

    write_zip(
        &zips.join("a.zip"),
        &[(
            "a.txt",
            "ShipVoyage|Port|Teu\nV1|Rotterdam|10\nV2|Hamburg|20\nV1|Antwerp|30\n".to_string(),
        )],
    );
    fs::write(zips.join("b.zip"), b"this archive is corrupted").unwrap();

    let config = PipelineConfig::from_args(PipelineArgs {
        zip_folder: zips,
        output_folder: out.clone(),
        merged_csv: merged.clone(),
    })
    .unwrap();

    let extract = ExtractCoordinator::new(config.extract.clone())
        .unwrap()
        .run()
        .unwrap();
    assert_eq!(extract.archives_found, 2);
    assert_eq!(extract.extracted, 1);
    assert_eq!(extract.failed, 1);
    assert!(out.join("a.txt").exists());

    let merge = merge_directory(&config.merge).unwrap();
    assert_eq!(merge.rows_written, 3);

    let (headers, rows) = read_csv(&merged);
    assert_eq!(headers, vec!["ShipVoyage", "Port", "Teu"]);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[2], vec!["V1", "Antwerp", "30"]);
}

#[test]
fn test_every_member_extracted_across_archives() {
    let dir = tempdir().unwrap();
    let zips = dir.path().join("zip");
    let out = dir.path().join("out");
    fs::create_dir(&zips).unwrap();

    for a in 0..6 {
        let names: Vec<String> = (0..3).map(|m| format!("arc{}_m{}.txt", a, m)).collect();
        let members: Vec<(&str, String)> = names
            .iter()
            .map(|n| (n.as_str(), "k|v\n1|2\n".to_string()))
            .collect();
        write_zip(&zips.join(format!("arc{}.ZIP", a)), &members);
    }

    let result = ExtractCoordinator::new(ExtractConfig::new(&zips, &out).with_workers(3))
        .unwrap()
        .run()
        .unwrap();

    assert!(result.all_extracted());
    assert_eq!(result.members, 18);
    for a in 0..6 {
        for m in 0..3 {
            assert!(out.join(format!("arc{}_m{}.txt", a, m)).exists());
        }
    }
}

#[test]
fn test_merge_bounded_chunks_large_input() {
    let dir = tempdir().unwrap();
    let mut expected = 0usize;

    for f in 0..3 {
        let mut body = String::from("ShipVoyage|Seq\n");
        let rows = 2_500 + f * 1_000;
        for i in 0..rows {
            body.push_str(&format!("V{}|{}\n", i % 7, i));
        }
        expected += rows;
        fs::write(dir.path().join(format!("part{}.txt", f)), body).unwrap();
    }

    let out = dir.path().join("merged.csv");
    let report = merge_directory(&MergeConfig::new(dir.path(), &out).with_chunk_size(512)).unwrap();

    assert_eq!(report.rows_written as usize, expected);
    assert_eq!(report.peak_batch_rows, 512);
    assert!(report.batches_written >= (expected / 512) as u64);

    let text = fs::read_to_string(&out).unwrap();
    assert_eq!(text.lines().count(), expected + 1);
    assert_eq!(text.matches("ShipVoyage,Seq").count(), 1);
}

#[test]
fn test_split_scenario() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("merged.csv");
    fs::write(&input, "ShipVoyage,Teu\nV1,10\nV2,20\nV1,30\n").unwrap();
    let out = dir.path().join("voyages");

    let report = split_by_key(&SplitConfig::new(&input, &out)).unwrap();
    assert_eq!(report.voyage_count(), 2);

    let (_, v1) = read_csv(&out.join("ShipVoyage_V1.csv"));
    let (_, v2) = read_csv(&out.join("ShipVoyage_V2.csv"));
    assert_eq!(v1.len(), 2);
    assert_eq!(v2.len(), 1);
    assert!(v1.iter().all(|r| r[0] == "V1"));
    assert_eq!(fs::read_dir(&out).unwrap().count(), 2);
}

#[test]
fn test_split_sanitized_name_collision_last_writer_wins() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("merged.csv");
    fs::write(&input, "ShipVoyage,Teu\nA:1,10\nA/1,20\nA:1,30\nB,40\n").unwrap();
    let out = dir.path().join("voyages");

    let report = split_by_key(&SplitConfig::new(&input, &out)).unwrap();
    assert_eq!(report.voyage_count(), 3);
    assert_eq!(report.distinct_files, 2);

    // "A/1" first appears after "A:1", so its single row is what survives
    let (_, rows) = read_csv(&out.join("ShipVoyage_A_1.csv"));
    assert_eq!(rows, vec![vec!["A/1".to_string(), "20".to_string()]]);

    let on_disk: usize = fs::read_dir(&out)
        .unwrap()
        .map(|e| read_csv(&e.unwrap().path()).1.len())
        .sum();
    assert_eq!(on_disk as u64, report.total_rows - 2);
}

#[test]
fn test_end_to_end_extract_merge_split() {
    let dir = tempdir().unwrap();
    let zips = dir.path().join("zip");
    let out = dir.path().join("unzipped");
    let merged = dir.path().join("merged.csv");
    let voyages = dir.path().join("voyages");
    fs::create_dir(&zips).unwrap();

    write_zip(
        &zips.join("jan.zip"),
        &[("jan.txt", "ShipVoyage|Teu\nMSC:01|5\nCMA/02|6\n".to_string())],
    );
    write_zip(
        &zips.join("feb.zip"),
        &[("feb.txt", "ShipVoyage|Teu\nMSC:01|7\n".to_string())],
    );

    let config = PipelineConfig::from_args(PipelineArgs {
        zip_folder: zips,
        output_folder: out,
        merged_csv: merged.clone(),
    })
    .unwrap();
    ExtractCoordinator::new(config.extract.clone())
        .unwrap()
        .run()
        .unwrap();
    merge_directory(&config.merge).unwrap();

    let report = split_by_key(&SplitConfig::new(&merged, &voyages)).unwrap();
    assert_eq!(report.total_rows, 3);

    let (_, msc) = read_csv(&voyages.join("ShipVoyage_MSC_01.csv"));
    let (_, cma) = read_csv(&voyages.join("ShipVoyage_CMA_02.csv"));
    assert_eq!(msc.len(), 2);
    assert_eq!(cma.len(), 1);
}
