/// A feed channel as handed over by a [`crate::sources::FeedSource`], before
/// canonicalization. Fields mirror what the parser exposes, so most are optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawChannel {
    pub title: Option<String>,
    pub items: Vec<RawItem>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawItem {
    pub title: Option<String>,
    pub description: Option<String>,
    pub categories: Option<Vec<String>>,
    pub image: Option<String>,
    pub link: Option<String>,
}

impl RawChannel {
    pub fn new(title: Option<String>) -> Self {
        Self {
            title,
            items: Vec::new(),
        }
    }

    pub fn with_item(mut self, item: RawItem) -> Self {
        self.items.push(item);
        self
    }
}

impl RawItem {
    pub fn new(title: Option<String>) -> Self {
        Self {
            title,
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_categories(mut self, categories: Option<Vec<String>>) -> Self {
        self.categories = categories;
        self
    }

    pub fn with_image(mut self, image: Option<String>) -> Self {
        self.image = image;
        self
    }

    pub fn with_link(mut self, link: Option<String>) -> Self {
        self.link = link;
        self
    }
}
