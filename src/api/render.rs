use crate::models::{ComparisonRequest, MediaEntry, TitleColumn};

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html prefix="og: https://ogp.me/ns#">
<head>
    <meta charset="UTF-8" />
    <title>{title}</title>
    <meta property="og:title" content="{title}" />
    <meta property="og:description" content="{description}" />
    <meta property="og:locale" content="en_GB" />
    <meta property="og:type" content="website" />
</head>
<body>
{body}
</body>
</html>
"#;

/// Renders the HTML comparison page with an OpenGraph summary and a result table
pub fn comparison_page(request: &ComparisonRequest, entries: &[MediaEntry]) -> String {
    let title = format!(
        "{}'s mutual '{}' {} entries",
        join_names(&request.usernames),
        request.status.title_case(),
        request.kind.as_lowercase()
    );

    let (description, body) = if entries.is_empty() {
        let message = format!(
            "No {} {} in common :(",
            request.status.as_lowercase(),
            request.kind.as_lowercase()
        );
        (message.clone(), format!("<p>{}</p>", escape(&message)))
    } else {
        (
            format!("They have {} mutual entries.", entries.len()),
            table(request, entries),
        )
    };

    fill(
        PAGE_TEMPLATE,
        &[
            ("{title}", escape(&title).as_str()),
            ("{description}", escape(&description).as_str()),
            ("{body}", body.as_str()),
        ],
    )
}

/// Substitutes placeholders in one pass; inserted values are never scanned again
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match values.iter().find(|(key, _)| tail.starts_with(key)) {
            Some((key, value)) => {
                out.push_str(value);
                rest = &tail[key.len()..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn table(request: &ComparisonRequest, entries: &[MediaEntry]) -> String {
    let columns = request.included_columns();

    let mut head = String::from("<th>Media ID</th>");
    for column in &columns {
        head.push_str(&format!("<th>{}</th>", column.label()));
    }
    head.push_str("<th>URL</th>");

    let rows: Vec<String> = entries
        .iter()
        .map(|entry| {
            let mut row = format!("<tr><td>{}</td>", entry.id);
            for column in &columns {
                let value = match column {
                    TitleColumn::Romaji => entry.titles.romaji.as_deref(),
                    TitleColumn::English => entry.titles.english.as_deref(),
                    TitleColumn::Native => entry.titles.native.as_deref(),
                };
                row.push_str(&format!("<td>{}</td>", escape(value.unwrap_or(""))));
            }
            match &entry.site_url {
                Some(url) => row.push_str(&format!(r#"<td><a href="{}">AniList</a></td>"#, escape(url))),
                None => row.push_str("<td></td>"),
            }
            row.push_str("</tr>");
            row
        })
        .collect();

    format!(
        "<table>\n<thead>\n<tr>{}</tr>\n</thead>\n<tbody>\n{}\n</tbody>\n</table>",
        head,
        rows.join("\n")
    )
}

/// "a and b", "a, b and c"
fn join_names(names: &[String]) -> String {
    match names {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
