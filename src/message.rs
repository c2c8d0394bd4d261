/// App-message type for a shared link card.
const APPMSG_TYPE_LINK: u32 = 5;

/// Fields of a link card.
#[derive(Debug, Clone)]
pub struct LinkCard<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub url: &'a str,
}

impl LinkCard<'_> {
    /// Render the XML app-message the session expects for link cards.
    pub fn to_xml(&self) -> String {
        format!(
            r#"<?xml version="1.0"?>
<msg>
    <appmsg appid="" sdkver="0">
        <title>{title}</title>
        <des>{des}</des>
        <url>{url}</url>
        <type>{kind}</type>
    </appmsg>
</msg>"#,
            title = escape_xml(self.title),
            des = escape_xml(self.description),
            url = escape_xml(self.url),
            kind = APPMSG_TYPE_LINK,
        )
    }
}

fn escape_xml(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_xml_embeds_fields() {
        let xml = LinkCard {
            title: "T",
            description: "",
            url: "https://x.com",
        }
        .to_xml();
        assert!(xml.starts_with(r#"<?xml version="1.0"?>"#));
        assert!(xml.contains("<title>T</title>"));
        assert!(xml.contains("<des></des>"));
        assert!(xml.contains("<url>https://x.com</url>"));
        assert!(xml.contains("<type>5</type>"));
    }

    #[test]
    fn test_link_xml_escapes_markup() {
        let xml = LinkCard {
            title: "Q&A <live>",
            description: "say \"hi\"",
            url: "https://x.com/?a=1&b=2",
        }
        .to_xml();
        assert!(xml.contains("<title>Q&amp;A &lt;live&gt;</title>"));
        assert!(xml.contains("<des>say &quot;hi&quot;</des>"));
        assert!(xml.contains("<url>https://x.com/?a=1&amp;b=2</url>"));
    }
}
