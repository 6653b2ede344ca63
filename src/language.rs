use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Java,
    Cpp,
    Go,
}

impl Language {
    pub fn name(&self) -> &'static str {
        match self {
            Language::Java => "java",
            Language::Cpp => "cpp",
            Language::Go => "go",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Language::Java => "Java",
            Language::Cpp => "C++",
            Language::Go => "Go",
        }
    }

    /// Starter program offered before the user writes anything.
    pub fn snippet(&self) -> &'static str {
        match self {
            Language::Java => {
                "public class Main {\n  public static void main(String[] args) throws Exception {\n  }\n}\n"
            }
            Language::Cpp => {
                "#include <iostream>\nusing namespace std;\n\nint main() {\n    return 0;\n}\n"
            }
            Language::Go => "package main\n\nimport \"fmt\"\n\nfunc main() {\n    fmt.Println()\n}\n",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "java" => Ok(Language::Java),
            "cpp" | "c++" => Ok(Language::Cpp),
            "go" | "golang" => Ok(Language::Go),
            other => Err(format!(
                "unsupported language {other:?}, expected one of: java, cpp, go"
            )),
        }
    }
}
