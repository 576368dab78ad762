//! Plain-text rendering of page state.

use dash_core::{Product, User};
use dash_views::{format_price, Notice, NoticeKind, ProductsState};

pub fn notice(notice: &Notice) -> String {
    let tag = match notice.kind {
        NoticeKind::Success => "ok",
        NoticeKind::Error => "error",
        NoticeKind::Info => "info",
    };
    format!("[{}] {}", tag, notice.text)
}

/// Product table for the current page, followed by a page indicator.
pub fn products(state: &ProductsState) -> String {
    let visible = state.visible();
    if visible.is_empty() {
        return "No products yet.\n".to_string();
    }

    let name_width = visible
        .iter()
        .map(|p| p.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("NAME".len());

    let mut lines = vec![format!(
        "{:>5}  {:<name_width$}  {:>16}  DESCRIPTION",
        "ID", "NAME", "PRICE"
    )];
    lines.extend(visible.iter().map(|p| product_row(p, name_width)));
    lines.push(format!(
        "Page {} of {} ({} products)",
        state.pagination.page(),
        state.total_pages(),
        state.products.len()
    ));
    lines.push(String::new());
    lines.join("\n")
}

fn product_row(product: &Product, name_width: usize) -> String {
    format!(
        "{:>5}  {:<name_width$}  {:>16}  {}",
        product.id.get(),
        product.name,
        format_price(product.price),
        product.description.as_deref().unwrap_or("-")
    )
}

pub fn user(user: &User) -> String {
    let mut out = format!(
        "ID:      {}\nName:    {}\nEmail:   {}\n",
        user.id, user.name, user.email
    );
    if let Some(created) = &user.created_at {
        out.push_str(&format!("Joined:  {}\n", created));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use dash_core::{ProductId, UserId};
    use dash_views::Pagination;

    fn product(id: i64, name: &str, price: f64) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            price,
            description: None,
            created_at: None,
            updated_at: None,
            user_id: None,
        }
    }

    #[test]
    fn renders_prices_with_thousands_separators() {
        let state = ProductsState {
            products: vec![product(1, "Kopi Susu", 20000.0)],
            ..ProductsState::default()
        };

        let out = products(&state);
        assert!(out.contains("Rp 20.000"));
        assert!(out.contains("Kopi Susu"));
        assert!(out.contains("Page 1 of 1 (1 products)"));
    }

    #[test]
    fn renders_only_current_page() {
        let mut pagination = Pagination::new(2);
        pagination.set_page(2, 3);
        let state = ProductsState {
            products: vec![
                product(1, "A1", 1.0),
                product(2, "B2", 2.0),
                product(3, "C3", 3.0),
            ],
            pagination,
            ..ProductsState::default()
        };

        let out = products(&state);
        assert!(out.contains("C3"));
        assert!(!out.contains("A1"));
        assert!(out.contains("Page 2 of 2"));
    }

    #[test]
    fn table_ends_with_page_line() {
        let state = ProductsState {
            products: vec![product(7, "Teh", 5000.0)],
            ..ProductsState::default()
        };

        let out = products(&state);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("   ID"));
        assert!(lines[1].starts_with("    7  Teh"));
        assert_eq!(lines[2], "Page 1 of 1 (1 products)");
        assert!(out.ends_with(")\n"));
    }

    #[test]
    fn empty_list() {
        assert_eq!(products(&ProductsState::default()), "No products yet.\n");
    }

    #[test]
    fn renders_user_and_notice() {
        let out = user(&User {
            id: UserId::new(1),
            name: "Ani".into(),
            email: "a@b.com".into(),
            created_at: Some("2024-01-01T00:00:00Z".into()),
        });
        assert!(out.contains("Email:   a@b.com"));
        assert!(out.contains("Joined:  2024-01-01T00:00:00Z"));

        assert_eq!(notice(&Notice::success("Product created")), "[ok] Product created");
    }
}
