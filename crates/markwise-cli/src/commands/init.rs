//! The `markwise init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create markwise.toml
    if std::path::Path::new("markwise.toml").exists() {
        println!("markwise.toml already exists, skipping.");
    } else {
        std::fs::write("markwise.toml", SAMPLE_CONFIG)?;
        println!("Created markwise.toml");
    }

    // Create sample CSVs
    std::fs::create_dir_all("samples")?;
    for (path, content) in [
        ("samples/marking-guide.csv", SAMPLE_GUIDE),
        ("samples/answer-sheet.csv", SAMPLE_ANSWERS),
    ] {
        if std::path::Path::new(path).exists() {
            println!("{path} already exists, skipping.");
        } else {
            std::fs::write(path, content)?;
            println!("Created {path}");
        }
    }

    println!("\nNext steps:");
    println!("  1. Edit markwise.toml with your API keys");
    println!("  2. Run: markwise validate --guide samples/marking-guide.csv");
    println!("  3. Run: markwise ingest --module demo --name \"Demo Module\" --guide samples/marking-guide.csv --answers samples/answer-sheet.csv");
    println!("  4. Run: markwise grade --module demo");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# markwise configuration

[providers.openai]
type = "openai"
api_key = "${OPENAI_API_KEY}"

[providers.anthropic]
type = "anthropic"
api_key = "${ANTHROPIC_API_KEY}"

default_provider = "openai"
default_model = "gpt-4o-mini"
temperature = 0.0
max_tokens = 500
parallelism = 4
request_timeout_secs = 60
data_dir = "./markwise-data"
report_dir = "./markwise-reports"
shortcut_phrases = ["give full marks", "award full marks"]
"#;

const SAMPLE_GUIDE: &str = "\
question_no,question,expected_answer,instruction,allocated_marks
1,Define an operating system.,System software that manages hardware resources and provides services to programs.,,10
2,Explain the difference between a process and a thread.,A process owns its address space; threads share one within a process.,Accept either direction of the comparison.,10
3,State the scheduling algorithm covered in week 3.,Round robin,give full marks,5
";

const SAMPLE_ANSWERS: &str = "\
student_id,q1,q2,q3
IT2001,An OS manages the computer's hardware and runs programs.,Processes have separate memory; threads share it.,Round robin
IT2002,Software.,A thread is lighter than a process.,
";
