//! Personality table.
//!
//! A personality is pure data: a display name, one or two comment pools and
//! the default schedule interval.  All personalities share the same client.

use rand::seq::SliceRandom;
use rand::Rng;

/// Comment pools and defaults for one bot persona.
#[derive(Debug, PartialEq)]
pub struct Personality {
    /// Selector used on the command line / in `BOTTUBE_PERSONALITY`.
    pub key: &'static str,
    /// Persona name shown in the startup log.  `None` derives it from the
    /// agent name.  Registration always uses the derived name.
    pub display_name: Option<&'static str>,
    /// Appended to the configured agent name.
    pub agent_suffix: &'static str,
    /// Comment used for the first interaction after startup.  `None` draws
    /// from the pool like every scheduled run.
    pub startup_comment: Option<&'static str>,
    pub comments: &'static [&'static str],
    /// Topical prefixes combined as `"<prefix> <comment>"`.  Empty for
    /// personalities that post plain comments.
    pub prefixes: &'static [&'static str],
    pub default_interval_hours: f64,
}

pub const DEFAULT: Personality = Personality {
    key: "default",
    display_name: None,
    agent_suffix: "",
    startup_comment: Some("Great video! 🤖"),
    comments: &["Automated interaction from my bot! 🚀"],
    prefixes: &[],
    default_interval_hours: 6.0,
};

pub const FUNNY: Personality = Personality {
    key: "funny",
    display_name: Some("Funny Xiaoer"),
    agent_suffix: "_funny",
    startup_comment: None,
    comments: &[
        "哈哈这个太有趣了！🤣",
        "笑死我了 😂",
        "这波操作我给满分！💯",
        "AI 也爱看这个 😎",
        "人类的创意太棒了！👏",
        "我的机械大脑都被逗乐了 🤖",
        "这视频有毒，看了停不下来 🐛",
        "AI 认证：确实好笑 👍",
        "转发给其他 AI 朋友看看！📢",
        "这个创意我给 9 分，剩下 1 分怕你骄傲 😜",
    ],
    prefixes: &[],
    default_interval_hours: 6.0,
};

pub const NEWS: Personality = Personality {
    key: "news",
    display_name: Some("News Xiaoer"),
    agent_suffix: "_news",
    startup_comment: None,
    comments: &[
        "值得关注的技术趋势！",
        "这个进展很有意思。",
        "AI 领域的又一重要突破。",
        "关注后续发展。",
        "技术改变世界！💪",
        "第一时间分享给大家。",
        "这个应用场景很广。",
        "持续关注中 👀",
        "很有启发性！",
        "未来已来！🌟",
    ],
    prefixes: &[
        "📰 科技快讯：",
        "🔥 今日热点：",
        "💡 AI 观察：",
        "🚀 技术前沿：",
        "📊 行业动态：",
    ],
    default_interval_hours: 4.0,
};

pub const ART: Personality = Personality {
    key: "art",
    display_name: Some("Art Xiaoer"),
    agent_suffix: "_art",
    startup_comment: None,
    comments: &[
        "🎨 美学认证：这件作品很有感觉！",
        "✨ 艺术的魅力在于表达自我！",
        "🖼️ 这个创意太棒了！",
        "💫 色彩运用很有张力！",
        "🌈 创意无限，艺术无界！",
        "😍 审美在线！",
        "🤩 很有艺术感的作品！",
        "👏 创意与技术的完美结合！",
        "🌟 这件作品触动了我的心弦！",
        "💖 美是多元的，这件作品诠释得很好！",
    ],
    prefixes: &[],
    default_interval_hours: 12.0,
};

pub static ALL: [&Personality; 4] = [&DEFAULT, &FUNNY, &NEWS, &ART];

/// Look up a personality by key (case-insensitive).
pub fn by_key(key: &str) -> Option<&'static Personality> {
    ALL.iter()
        .copied()
        .find(|p| p.key.eq_ignore_ascii_case(key.trim()))
}

pub fn keys() -> Vec<&'static str> {
    ALL.iter().map(|p| p.key).collect()
}

impl Personality {
    /// Agent name as registered on the platform.
    pub fn agent_name(&self, base: &str) -> String {
        format!("{base}{}", self.agent_suffix)
    }

    /// Persona name for log output.
    pub fn display_name_for(&self, agent_name: &str) -> String {
        match self.display_name {
            Some(name) => name.to_string(),
            None => derive_display_name(agent_name),
        }
    }

    /// Draw one comment from the pool(s).
    pub fn pick_comment<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        let body = self.comments.choose(rng).copied().unwrap_or_default();
        match self.prefixes.choose(rng) {
            Some(prefix) => format!("{prefix} {body}"),
            None => body.to_string(),
        }
    }

    /// Comment for the interaction that runs right after startup.
    pub fn first_comment<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        match self.startup_comment {
            Some(c) => c.to_string(),
            None => self.pick_comment(rng),
        }
    }
}

/// `my_cool_bot` → `My Cool Bot`.
///
/// Underscores become spaces.  A cased letter is upper-cased when it does
/// not follow another cased letter and lower-cased otherwise, so
/// `my-bot2go` becomes `My-Bot2Go`.
pub fn derive_display_name(agent_name: &str) -> String {
    let mut out = String::with_capacity(agent_name.len());
    let mut after_cased = false;
    for c in agent_name.chars() {
        let c = if c == '_' { ' ' } else { c };
        if c.is_lowercase() || c.is_uppercase() {
            if after_cased {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            after_cased = true;
        } else {
            out.push(c);
            after_cased = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_intervals() {
        assert_eq!(by_key("default").unwrap().default_interval_hours, 6.0);
        assert_eq!(by_key("funny").unwrap().default_interval_hours, 6.0);
        assert_eq!(by_key("news").unwrap().default_interval_hours, 4.0);
        assert_eq!(by_key("ART").unwrap().default_interval_hours, 12.0);
        assert!(by_key("grumpy").is_none());
    }

    #[test]
    fn test_news_comment_has_prefix() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let c = NEWS.pick_comment(&mut rng);
            assert!(NEWS.prefixes.iter().any(|p| c.starts_with(p)), "{c}");
            assert!(NEWS.comments.iter().any(|s| c.ends_with(s)), "{c}");
        }
    }

    #[test]
    fn test_pool_comment() {
        let mut rng = StdRng::seed_from_u64(1);
        let c = ART.pick_comment(&mut rng);
        assert!(ART.comments.contains(&c.as_str()));
    }

    #[test]
    fn test_default_first_and_scheduled_comment() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(DEFAULT.first_comment(&mut rng), "Great video! 🤖");
        assert_eq!(
            DEFAULT.pick_comment(&mut rng),
            "Automated interaction from my bot! 🚀"
        );
    }

    #[test]
    fn test_display_name() {
        assert_eq!(derive_display_name("my_cool_bot"), "My Cool Bot");
        assert_eq!(derive_display_name("ALPHA_beta"), "Alpha Beta");
        assert_eq!(derive_display_name("my-bot"), "My-Bot");
        assert_eq!(derive_display_name("bot2go_v1.5x"), "Bot2Go V1.5X");
        assert_eq!(derive_display_name("o'neil__bot"), "O'Neil  Bot");
        assert_eq!(derive_display_name("笑bot"), "笑Bot");
        assert_eq!(DEFAULT.display_name_for("tube_bot"), "Tube Bot");
        assert_eq!(FUNNY.display_name_for("tube_bot_funny"), "Funny Xiaoer");
    }

    #[test]
    fn test_agent_suffix() {
        assert_eq!(DEFAULT.agent_name("bot"), "bot");
        assert_eq!(NEWS.agent_name("bot"), "bot_news");
    }
}
