use chrono::{DateTime, Local};
use rand::{seq::SliceRandom, Rng};

/// What a registered command does when it is run.
#[derive(Clone, Debug)]
pub(crate) enum Action {
    Static(&'static [&'static str]),
    Help,
    Navigate {
        path: &'static str,
        lines: &'static [&'static str],
    },
    Dynamic(Dynamic),
    Clear,
    Snake,
}

/// Commands whose output is computed at run time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Dynamic {
    Matrix,
    Joke,
    Date,
}

#[derive(Clone, Debug)]
pub(crate) struct CommandSpec {
    pub(crate) name: &'static str,
    pub(crate) summary: &'static str,
    pub(crate) action: Action,
}

/// Pages reachable with `open <page>`, keyed by the name typed after `open`.
pub(crate) const PAGES: &[(&str, &str)] = &[
    ("home", "/"),
    ("projects", "/projects"),
    ("resume", "/resume"),
    ("contact", "/contact"),
    ("blog", "/blog"),
    ("gallery", "/gallery"),
    ("academy", "/private-academy"),
    ("support", "/support"),
];

/// Prefix commands; listed in help after the table entries.
pub(crate) const PREFIX_HELP: &[(&str, &str)] = &[
    ("echo <text>", "Print text back"),
    ("open <page>", "Go to a page (home, projects, resume, contact, ...)"),
];

/// Immutable command table. Built once and shared by reference.
#[derive(Clone, Debug)]
pub(crate) struct CommandRegistry {
    entries: Vec<CommandSpec>,
    aliases: Vec<(&'static str, &'static str)>,
    help: Vec<String>,
}

impl CommandRegistry {
    pub(crate) fn new(entries: Vec<CommandSpec>, aliases: Vec<(&'static str, &'static str)>) -> Self {
        let help = help_block(&entries);
        Self {
            entries,
            aliases,
            help,
        }
    }

    pub(crate) fn portfolio() -> Self {
        let cmd = |name, summary, action| CommandSpec {
            name,
            summary,
            action,
        };
        Self::new(
            vec![
                cmd("about", "Learn about me", Action::Static(ABOUT)),
                cmd("skills", "View my technical skills", Action::Static(SKILLS)),
                cmd("projects", "See my featured projects", Action::Static(PROJECTS)),
                cmd("contact", "Get my contact info", Action::Static(CONTACT)),
                cmd("social", "View my social links", Action::Static(SOCIAL)),
                cmd(
                    "resume",
                    "Open my resume",
                    Action::Navigate {
                        path: "/resume",
                        lines: RESUME,
                    },
                ),
                cmd("whoami", "Who is at the keyboard", Action::Static(WHOAMI)),
                cmd("date", "Show the current date and time", Action::Dynamic(Dynamic::Date)),
                cmd("joke", "Hear a programming joke", Action::Dynamic(Dynamic::Joke)),
                cmd("matrix", "Follow the white rabbit", Action::Dynamic(Dynamic::Matrix)),
                cmd("flip", "Flip a table", Action::Static(FLIP)),
                cmd("snake", "Play a game of snake", Action::Snake),
                cmd("clear", "Clear the terminal", Action::Clear),
                cmd("help", "Show this help message", Action::Help),
            ],
            vec![("?", "help")],
        )
    }

    /// Looks up an already normalized (trimmed, lowercased) name, following aliases.
    pub(crate) fn get(&self, name: &str) -> Option<&CommandSpec> {
        let name = self
            .aliases
            .iter()
            .find(|(alias, _)| *alias == name)
            .map(|(_, target)| *target)
            .unwrap_or(name);
        self.entries.iter().find(|e| e.name == name)
    }

    pub(crate) fn entries(&self) -> &[CommandSpec] {
        &self.entries
    }

    pub(crate) fn aliases(&self) -> &[(&'static str, &'static str)] {
        &self.aliases
    }

    pub(crate) fn help_lines(&self) -> &[String] {
        &self.help
    }
}

fn help_block(entries: &[CommandSpec]) -> Vec<String> {
    let mut out = vec!["Available commands:".to_string(), String::new()];
    for e in entries {
        out.push(format!("  {:<10} - {}", e.name, e.summary));
    }
    out.push(String::new());
    for (usage, summary) in PREFIX_HELP {
        out.push(format!("  {:<12} - {}", usage, summary));
    }
    out
}

pub(crate) fn page_path(name: &str) -> Option<&'static str> {
    PAGES.iter().find(|(n, _)| *n == name).map(|(_, p)| *p)
}

pub(crate) fn joke<R: Rng + ?Sized>(rng: &mut R) -> String {
    JOKES.choose(rng).copied().unwrap_or(JOKES[0]).to_string()
}

pub(crate) const MATRIX_ROWS: usize = 8;
pub(crate) const MATRIX_COLS: usize = 48;

/// Fresh rain every call: half-width katakana, digits and capitals.
///
/// Only single-cell glyphs are used so rows line up in a monospace grid.
pub(crate) fn matrix<R: Rng + ?Sized>(rng: &mut R) -> Vec<String> {
    let mut out: Vec<String> = (0..MATRIX_ROWS)
        .map(|_| (0..MATRIX_COLS).map(|_| matrix_glyph(rng)).collect())
        .collect();
    out.push(String::new());
    out.push("Wake up, Neo...".to_string());
    out
}

fn matrix_glyph<R: Rng + ?Sized>(rng: &mut R) -> char {
    // 70% katakana, 15% digits, 10% A-Z, 5% blank
    let roll: u8 = rng.gen_range(0..100);
    if roll < 70 {
        char::from_u32(rng.gen_range(0xFF66u32..=0xFF9D)).unwrap_or('0')
    } else if roll < 85 {
        rng.gen_range(b'0'..=b'9') as char
    } else if roll < 95 {
        rng.gen_range(b'A'..=b'Z') as char
    } else {
        ' '
    }
}

pub(crate) fn date(now: DateTime<Local>) -> String {
    now.format("%a %b %d %Y %H:%M:%S").to_string()
}

pub(crate) const BANNER: &[&str] = &[
    "██╗  ██╗ █████╗ ██████╗  █████╗ ███╗   ██╗",
    "██║ ██╔╝██╔══██╗██╔══██╗██╔══██╗████╗  ██║",
    "█████╔╝ ███████║██████╔╝███████║██╔██╗ ██║",
    "██╔═██╗ ██╔══██║██╔══██╗██╔══██║██║╚██╗██║",
    "██║  ██╗██║  ██║██║  ██║██║  ██║██║ ╚████║",
    "╚═╝  ╚═╝╚═╝  ╚═╝╚═╝  ╚═╝╚═╝  ╚═╝╚═╝  ╚═══╝",
];

pub(crate) const WELCOME: &[&str] = &[
    "Welcome to my portfolio CLI!",
    "Type 'help' or '?' to see available commands.",
];

pub(crate) const SNAKE_STARTED: &[&str] = &[
    "Starting Snake...",
    "Arrow keys or WASD to steer, Q or Esc to quit.",
];

const ABOUT: &[&str] = &[
    "Hi! I'm Karan Gholap",
    "",
    "A Software Developer from Pune, India.",
    "I specialize in building responsive, user-friendly applications",
    "using React.js, Node.js, and various database systems.",
    "",
    "Currently working as a Trainee Developer at CandorWorks",
    "and Founder and Software Developer of Private Academy Engineering.",
];

const SKILLS: &[&str] = &[
    "Technical Skills:",
    "",
    "  Frontend   → React.js, Next.js, TypeScript, Tailwind CSS",
    "  Backend    → Node.js, Express.js, Python, REST APIs",
    "  Database   → MongoDB, PostgreSQL, MySQL",
    "  DevOps     → Git, Docker, AWS, Vercel",
    "  Tools      → VS Code, Figma, Postman",
];

const PROJECTS: &[&str] = &[
    "Featured Projects:",
    "",
    "  1. Private Academy Engineering",
    "     → Educational platform for engineering students",
    "",
    "  2. PrivMate - AI Study Companion",
    "     → AI-powered study companion",
    "",
    "  3. Bilix - Invoice Generator",
    "     → Sleek invoice generator with customizable templates",
    "",
    "Type 'open projects' to view all projects",
];

const CONTACT: &[&str] = &[
    "Contact Information:",
    "",
    "  Email     → karangholap@zohomail.in",
    "  LinkedIn  → linkedin.com/in/karangholap",
    "  GitHub    → github.com/karangholap154",
    "  Instagram → instagram.com/thekarangholap",
];

const SOCIAL: &[&str] = &[
    "Social Links:",
    "",
    "  GitHub     → https://github.com/karangholap154",
    "  LinkedIn   → https://linkedin.com/in/karangholap",
    "  X/Twitter  → https://x.com/TheKaranGholap",
    "  Instagram  → https://instagram.com/thekarangholap",
    "  Medium     → https://medium.com/@karan_gholap",
];

pub(crate) const RESUME: &[&str] = &["Resume:", "", "  Opening resume page...", "  Or visit: /resume"];

pub(crate) const OPEN_PROJECTS: &[&str] = &["Navigating to projects page..."];

const WHOAMI: &[&str] = &["guest@portfolio"];

const FLIP: &[&str] = &["(╯°□°)╯ ~ ┻━┻", "", "...okay, putting it back.", "┬─┬ノ( º _ ºノ)"];

const JOKES: &[&str] = &[
    "Why do programmers prefer dark mode? Because light attracts bugs.",
    "There are 10 kinds of people: those who understand binary and those who don't.",
    "A SQL query walks into a bar, walks up to two tables and asks: 'Can I join you?'",
    "I would tell you a UDP joke, but you might not get it.",
    "It works on my machine. Then we'll ship your machine.",
    "Why did the developer go broke? Because he used up all his cache.",
    "Debugging: being the detective in a crime movie where you are also the murderer.",
    "!false - it's funny because it's true.",
];
