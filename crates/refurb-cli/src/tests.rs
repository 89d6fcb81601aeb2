use super::*;

#[test]
fn parses_scrape_all_vendors() {
    let cli = Cli::try_parse_from(["refurb", "scrape"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Commands::Scrape {
            vendor: None,
            max_pages: None
        }
    ));
}

#[test]
fn parses_scrape_single_vendor() {
    let cli = Cli::try_parse_from(["refurb", "scrape", "--vendor", "PCLiquidations"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Commands::Scrape { vendor: Some(ref v), .. } if v == "PCLiquidations"
    ));
}

#[test]
fn parses_scrape_max_pages() {
    let cli = Cli::try_parse_from(["refurb", "scrape", "--max-pages", "3"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Commands::Scrape {
            max_pages: Some(3),
            ..
        }
    ));
}

#[test]
fn parses_parse_page() {
    let cli = Cli::try_parse_from([
        "refurb",
        "parse-page",
        "--file",
        "page.md",
        "--url",
        "https://www.pcliquidations.com/laptops",
    ])
    .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Commands::ParsePage { ref file, ref url, vendor: None }
            if file == &PathBuf::from("page.md") && url == "https://www.pcliquidations.com/laptops"
    ));
}

#[test]
fn parse_page_requires_url() {
    let result = Cli::try_parse_from(["refurb", "parse-page", "--file", "page.md"]);
    assert!(result.is_err());
}

#[test]
fn parses_report_date() {
    let cli = Cli::try_parse_from(["refurb", "report", "--date", "2025-11-03"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Commands::Report { date: Some(d), history_dir: None }
            if d == NaiveDate::from_ymd_opt(2025, 11, 3).expect("valid date")
    ));
}

#[test]
fn report_rejects_malformed_date() {
    let result = Cli::try_parse_from(["refurb", "report", "--date", "03/11/2025"]);
    assert!(result.is_err());
}

#[test]
fn parses_report_history_dir() {
    let cli = Cli::try_parse_from(["refurb", "report", "--history-dir", "/tmp/history"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Commands::Report { date: None, history_dir: Some(ref dir) }
            if dir == &PathBuf::from("/tmp/history")
    ));
}

#[test]
fn parses_compare_flags() {
    let cli = Cli::try_parse_from(["refurb", "compare"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Compare { all: false }));

    let cli = Cli::try_parse_from(["refurb", "compare", "--all"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Compare { all: true }));
}

#[test]
fn parses_summary() {
    let cli = Cli::try_parse_from(["refurb", "summary"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Summary));
}

#[test]
fn missing_subcommand_is_error() {
    assert!(Cli::try_parse_from(["refurb"]).is_err());
}
