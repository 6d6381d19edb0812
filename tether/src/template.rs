use crate::{
    config::PageConfig,
    dom::{Document, ElementSpec},
    handler::{client, comment, follow, rating},
};

/// like and dislike, in that order.
const RATINGS: &[(i64, &str)] = &[(1, "+"), (-1, "-")];

/// starting document: client form, profile with follow button, rating
/// buttons and the comment section of one article.
pub(crate) fn document(page: &PageConfig) -> Document {
    let mut doc = Document::new();
    let root = doc.root();

    doc.append(
        root,
        ElementSpec::new("div")
            .id("client")
            .child(ElementSpec::new("input").id(client::NAME_INPUT).attr("value", page.client_name.as_str()))
            .child(
                ElementSpec::new("input")
                    .id(client::CHANNEL_INPUT)
                    .attr("value", page.client_channel.as_str()),
            )
            .child(ElementSpec::new("button").id(client::CREATE_BUTTON).text("Create client")),
    );

    doc.append(
        root,
        ElementSpec::new("div")
            .class("profile")
            .child(
                ElementSpec::new("button")
                    .class("btn btn-primary")
                    .class(follow::BUTTON)
                    .attr("data-slug", page.profile_slug.as_str())
                    .text("Follow"),
            )
            .child(ElementSpec::new("div").class("row").class(follow::FOLLOWERS)),
    );

    let mut ratings = ElementSpec::new("div").class("rating");
    for (value, label) in RATINGS {
        ratings = ratings.child(
            ElementSpec::new("button")
                .class("btn btn-sm")
                .class(rating::BUTTONS)
                .attr("data-article", page.article_id.as_str())
                .attr("data-value", value.to_string())
                .text(*label)
                .child(ElementSpec::new("span").class(rating::SUM).text("0")),
        );
    }
    doc.append(root, ratings);

    doc.append(root, ElementSpec::new("div").class(comment::ROOT_THREAD));
    doc.append(
        root,
        ElementSpec::new("form")
            .attr("name", comment::FORM)
            .id(comment::FORM)
            .attr("data-article-id", page.article_id.as_str())
            .child(
                ElementSpec::new("textarea")
                    .attr("name", comment::CONTENT_FIELD)
                    .attr("value", page.comment.as_str()),
            )
            .child(
                ElementSpec::new("input")
                    .attr("type", "hidden")
                    .attr("name", comment::PARENT_FIELD)
                    .attr("value", ""),
            )
            .child(
                ElementSpec::new("button")
                    .attr("type", "submit")
                    .attr("name", comment::SUBMIT)
                    .text("Add comment"),
            ),
    );
    doc
}

#[cfg(test)]
mod tests {
    use super::document;
    use crate::{
        config::PageConfig,
        handler::{comment, follow, rating},
    };

    #[test]
    fn handlers_find_their_elements() {
        let doc = document(&PageConfig::default());
        let form = doc.form(comment::FORM).unwrap();
        assert_eq!(doc.attr(form, "data-article-id"), Some("1"));
        assert!(doc.field(form, comment::SUBMIT).is_some());
        assert!(doc.first_by_class(comment::ROOT_THREAD).is_some());
        let button = doc.first_by_class(follow::BUTTON).unwrap();
        assert_eq!(doc.attr(button, "data-slug"), Some("admin"));
        assert!(doc.first_by_class(follow::FOLLOWERS).is_some());
        let ratings = doc.all_by_class(rating::BUTTONS);
        assert_eq!(ratings.len(), 2);
        assert_eq!(doc.attr(ratings[1], "data-value"), Some("-1"));
        assert!(doc.find_within(ratings[0], rating::SUM).is_some());
    }
}
