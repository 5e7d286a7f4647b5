#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;
    use std::sync::atomic::Ordering;
    use std::time::Duration;
    use tempfile::{ tempdir, TempDir };

    use crate::config::FillOptions;
    use crate::errors::FillerError;
    use crate::pipeline::orchestrator::FixtureFiller;
    use crate::tests::support::{
        mock_tools,
        reference_time,
        set_mtime,
        snapshot,
        state_test_entry,
        tracing_mock_tools,
        write_module,
    };

    /// A filler tree with two packages and three units, plus an output dir
    fn workspace() -> (TempDir, FillOptions) {
        let dir = tempdir().unwrap();
        let fillers = dir.path().join("fillers");
        write_module(
            &fillers,
            &["vm", "vm_tests"],
            "arithmetic",
            &format!("{}{}", state_test_entry("add"), state_test_entry("sub"))
        );
        write_module(&fillers, &["paris", "security"], "selfdestruct", &state_test_entry("balance_bug"));

        let options = FillOptions {
            filler_path: fillers,
            output: dir.path().join("fixtures"),
            ..FillOptions::default()
        };
        (dir, options)
    }

    fn module_path(options: &FillOptions) -> std::path::PathBuf {
        options.filler_path.join("vm").join("vm_tests").join("arithmetic.yml")
    }

    #[tokio::test]
    async fn fills_every_unit_into_the_mirrored_hierarchy() {
        let (_dir, options) = workspace();
        let (t8n, b11r, tools) = mock_tools();
        let output = options.output.clone();

        let report = FixtureFiller::with_tools(options, tools).fill().await.unwrap();

        assert!(report.is_success());
        assert_eq!(report.discovered, 3);
        assert_eq!(report.filled.len(), 3);
        assert!(report.skipped.is_empty());
        assert_eq!(t8n.calls.load(Ordering::SeqCst), 3);
        assert_eq!(b11r.calls.load(Ordering::SeqCst), 3);
        assert!(output.join("vm/vm_tests/add.json").is_file());
        assert!(output.join("vm/vm_tests/sub.json").is_file());
        assert!(output.join("paris/security/balance_bug.json").is_file());

        let add: serde_json::Value = serde_json
            ::from_slice(&fs::read(output.join("vm/vm_tests/add.json")).unwrap())
            .unwrap();
        assert_eq!(add["add"]["_info"]["source"], "vm.vm_tests.arithmetic.add");
        assert_eq!(add["add"]["sealEngine"], "NoProof");
    }

    #[tokio::test]
    async fn second_run_skips_everything_and_leaves_bytes_unchanged() {
        let (_dir, options) = workspace();
        let output = options.output.clone();

        let (_, _, tools) = mock_tools();
        let first = FixtureFiller::with_tools(options.clone(), tools).fill().await.unwrap();
        assert_eq!(first.filled.len(), 3);
        let before = snapshot(&output);

        let (t8n, _, tools) = mock_tools();
        let second = FixtureFiller::with_tools(options, tools).fill().await.unwrap();

        assert_eq!(second.skipped.len(), 3);
        assert!(second.filled.is_empty());
        assert_eq!(t8n.calls.load(Ordering::SeqCst), 0);
        assert_eq!(snapshot(&output), before);
    }

    #[tokio::test]
    async fn touching_a_module_refills_only_its_units() {
        let (_dir, options) = workspace();
        let (_, _, tools) = mock_tools();
        FixtureFiller::with_tools(options.clone(), tools).fill().await.unwrap();

        let t = reference_time();
        let add = options.output.join("vm/vm_tests/add.json");
        let sub = options.output.join("vm/vm_tests/sub.json");
        let bug = options.output.join("paris/security/balance_bug.json");
        for path in [&add, &sub, &bug] {
            set_mtime(path, t);
        }
        set_mtime(&module_path(&options), t - Duration::from_secs(1));
        set_mtime(
            &options.filler_path.join("paris/security/selfdestruct.yml"),
            t - Duration::from_secs(1)
        );

        let (t8n, _, tools) = mock_tools();
        let report = FixtureFiller::with_tools(options.clone(), tools).fill().await.unwrap();
        assert_eq!(report.skipped.len(), 3);
        assert_eq!(t8n.calls.load(Ordering::SeqCst), 0);

        set_mtime(&module_path(&options), t + Duration::from_secs(1));
        let (t8n, _, tools) = mock_tools();
        let report = FixtureFiller::with_tools(options, tools).fill().await.unwrap();
        assert_eq!(report.filled.len(), 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(t8n.calls.load(Ordering::SeqCst), 2);
        assert!(fs::metadata(&add).unwrap().modified().unwrap() > t);
    }

    #[tokio::test]
    async fn no_skip_forces_every_unit() {
        let (_dir, options) = workspace();
        let (_, _, tools) = mock_tools();
        FixtureFiller::with_tools(options.clone(), tools).fill().await.unwrap();

        let forced = FillOptions { no_skip: true, ..options };
        let (t8n, _, tools) = mock_tools();
        let report = FixtureFiller::with_tools(forced, tools).fill().await.unwrap();

        assert_eq!(report.filled.len(), 3);
        assert!(report.skipped.is_empty());
        assert_eq!(t8n.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn flat_output_and_name_filter() {
        let (_dir, options) = workspace();
        let options = FillOptions {
            no_output_structure: true,
            test_case: Some("ad".to_string()),
            ..options
        };
        let output = options.output.clone();
        let (_, _, tools) = mock_tools();

        let report = FixtureFiller::with_tools(options, tools).fill().await.unwrap();

        assert_eq!(report.filled.len(), 1);
        assert!(output.join("add.json").is_file());
        assert!(!output.join("vm").exists());
    }

    #[tokio::test]
    async fn filter_matching_nothing_is_an_empty_run() {
        let (_dir, options) = workspace();
        let options = FillOptions {
            test_categories: Some(vec!["cancun".to_string()]),
            ..options
        };
        let output = options.output.clone();
        let (_, _, tools) = mock_tools();

        let report = FixtureFiller::with_tools(options, tools).fill().await.unwrap();

        assert_eq!(report.discovered, 0);
        assert!(report.is_success());
        assert!(output.is_dir());
    }

    #[tokio::test]
    async fn serial_and_parallel_runs_produce_identical_files() {
        let (_serial_dir, serial) = workspace();
        let (_parallel_dir, parallel) = workspace();
        let serial = FillOptions { max_workers: Some(1), ..serial };
        let parallel = FillOptions { max_workers: Some(8), ..parallel };

        let (_, _, tools) = mock_tools();
        FixtureFiller::with_tools(serial.clone(), tools).fill().await.unwrap();
        let (_, _, tools) = mock_tools();
        FixtureFiller::with_tools(parallel.clone(), tools).fill().await.unwrap();

        assert_eq!(snapshot(&serial.output), snapshot(&parallel.output));
        assert_eq!(snapshot(&serial.output).len(), 3);
    }

    #[tokio::test]
    async fn failing_unit_does_not_stop_the_others() {
        let (_dir, options) = workspace();
        // A blockchain test without blocks fails at execution time
        write_module(
            &options.filler_path,
            &["vm"],
            "broken",
            "empty_chain:\n  filler: {}\n  blockchain_test:\n    genesis: {}\n    pre: {}\n    blocks: []\n"
        );
        let output = options.output.clone();
        let (_, _, tools) = mock_tools();

        let report = FixtureFiller::with_tools(options, tools).fill().await.unwrap();

        assert!(!report.is_success());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].address.to_string(), "vm.broken.empty_chain");
        assert_eq!(report.filled.len(), 3);
        assert!(!output.join("vm/empty_chain.json").exists());
        assert!(output.join("vm/vm_tests/add.json").is_file());
    }

    #[tokio::test]
    async fn traces_land_next_to_their_fixtures() {
        let (_dir, options) = workspace();
        let options = FillOptions { traces: true, ..options };
        let output = options.output.clone();
        let (_, _, tools) = tracing_mock_tools();

        let report = FixtureFiller::with_tools(options, tools).fill().await.unwrap();

        assert!(report.is_success());
        let traces = fs::read_to_string(output.join("vm/vm_tests/add.traces.jsonl")).unwrap();
        assert_eq!(traces.lines().count(), 1);
        assert!(output.join("paris/security/balance_bug.traces.jsonl").is_file());
    }

    #[tokio::test]
    async fn unreadable_output_fails_only_its_unit() {
        let (_dir, options) = workspace();
        // Longer than any file name the filesystem accepts
        let long_name = "a".repeat(300);
        write_module(&options.filler_path, &["vm"], "long", &state_test_entry(&long_name));
        let (_, _, tools) = mock_tools();

        let report = FixtureFiller::with_tools(options, tools).fill().await.unwrap();

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].address.name, long_name);
        assert_eq!(report.filled.len(), 3);
    }

    #[tokio::test]
    async fn benchmark_reports_elapsed_time() {
        let (_dir, options) = workspace();
        let options = FillOptions { benchmark: true, ..options };
        let (_, _, tools) = mock_tools();

        let report = FixtureFiller::with_tools(options, tools).fill().await.unwrap();
        assert!(report.elapsed.is_some());
    }

    #[tokio::test]
    async fn missing_filler_root_aborts_before_execution() {
        let dir = tempdir().unwrap();
        let options = FillOptions {
            filler_path: dir.path().join("nope"),
            output: dir.path().join("fixtures"),
            ..FillOptions::default()
        };
        let (t8n, _, tools) = mock_tools();

        let err = FixtureFiller::with_tools(options, tools).fill().await.unwrap_err();

        assert!(matches!(err, FillerError::DiscoveryError { .. }));
        assert_eq!(t8n.calls.load(Ordering::SeqCst), 0);
        assert!(!Path::new(&dir.path().join("fixtures")).exists());
    }
}
