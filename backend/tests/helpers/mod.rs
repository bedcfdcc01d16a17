use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;

use dotenvy::dotenv;

use quranjar_backend::corpus::{parse_corpus, Corpus};

static TEST_ENV: Once = Once::new();

pub const CORPUS_HEADER: &str = "surah_no,ayah_no,surah_name,ayah_arabic,emotion,ayah_english";

/// Keep test runs from writing log files into the user's data dir.
///
/// Every test calls this first, so the env is settled before any test
/// thread reads it.
pub fn test_env_setup() {
    TEST_ENV.call_once(|| {
        dotenv().ok();
        unsafe { env::set_var("DISABLE_LOG", "true"); }
    });
}

/// Ten well-formed rows and two with the wrong column count. The bad rows
/// are on lines 4 and 13.
#[allow(dead_code)]
pub fn corpus_text_with_malformed_rows() -> String {
    let mut lines = vec![CORPUS_HEADER.to_string()];
    for ayah in 1..=5 {
        lines.push(format!("1,{},Al-Fatiha,آية {},joy,Al-Fatiha verse {}", ayah, ayah, ayah));
    }
    // five columns
    lines.insert(3, "2,255,Al-Baqarah,اللَّهُ لَا إِلَٰهَ,missing the emotion column".to_string());
    for ayah in 1..=5 {
        lines.push(format!("94,{},Ash-Sharh,آية {},sadness,Ash-Sharh verse {}", ayah, ayah, ayah));
    }
    // seven columns, the comma in the text splits it
    lines.push("2,286,Al-Baqarah,a,hope,Allah does not burden a soul, beyond its capacity".to_string());
    lines.join("\n") + "\n"
}

#[allow(dead_code)]
pub fn small_corpus_text() -> String {
    [
        CORPUS_HEADER,
        "2,153,Al-Baqarah,يَا أَيُّهَا الَّذِينَ آمَنُوا,hope,O you who have believed seek help through patience and prayer",
        "3,139,Ali 'Imran,وَلَا تَهِنُوا,sadness,So do not weaken and do not grieve",
        "13,28,Ar-Ra'd,أَلَا بِذِكْرِ اللَّهِ,joy,Unquestionably by the remembrance of Allah hearts are assured",
        "94,6,Ash-Sharh,إِنَّ مَعَ الْعُسْرِ يُسْرًا,hope,Indeed with hardship will be ease",
        "8,2,Al-Anfal,إِذَا ذُكِرَ اللَّهُ وَجِلَتْ,fear,The believers are only those who when Allah is mentioned their hearts become fearful",
    ]
    .join("\n")
}

#[allow(dead_code)]
pub fn small_corpus() -> Corpus {
    parse_corpus(&small_corpus_text()).into_corpus()
}

#[allow(dead_code)]
pub fn write_corpus(dir: &Path, file_name: &str, content: &str) -> PathBuf {
    let path = dir.join(file_name);
    fs::write(&path, content).expect("Can't write corpus fixture");
    path
}
