//! The storefront route table.

use shop_router::RouteRecord;

/// Route names referenced from code.
pub mod names {
    pub const HOME: &str = "Home";
    pub const LOGIN: &str = "Login";
    pub const NOT_FOUND: &str = "NotFound";
}

/// Declarative route tree of the storefront.
pub fn storefront_routes() -> Vec<RouteRecord> {
    vec![
        RouteRecord::new("/", "layouts/MainLayout").children(vec![
            RouteRecord::new("", "views/Home").named(names::HOME),
            RouteRecord::new("category/:id", "views/Category").named("Category"),
            RouteRecord::new("product/:id", "views/Product").named("Product"),
            RouteRecord::new("purchase/:id", "views/Purchase")
                .named("Purchase")
                .requires_auth(),
            RouteRecord::new("orders", "views/Orders")
                .named("Orders")
                .requires_auth(),
            RouteRecord::new("order/:orderNo", "views/OrderDetail")
                .named("OrderDetail")
                .requires_auth(),
            RouteRecord::new("profile", "views/Profile")
                .named("Profile")
                .requires_auth(),
        ]),
        RouteRecord::new("/admin", "layouts/AdminLayout")
            .requires_auth()
            .requires_admin()
            .children(vec![
                RouteRecord::new("", "views/admin/Dashboard").named("AdminDashboard"),
                RouteRecord::new("categories", "views/admin/Categories").named("AdminCategories"),
                RouteRecord::new("products", "views/admin/Products").named("AdminProducts"),
                RouteRecord::new("cards", "views/admin/Cards").named("AdminCards"),
                RouteRecord::new("orders", "views/admin/Orders").named("AdminOrders"),
                RouteRecord::new("users", "views/admin/Users").named("AdminUsers"),
                RouteRecord::new("settings", "views/admin/Settings").named("AdminSettings"),
            ]),
        RouteRecord::new("/login", "views/Login").named(names::LOGIN),
        RouteRecord::new("/*pathMatch", "views/NotFound").named(names::NOT_FOUND),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use shop_router::RouteRegistry;

    #[test]
    fn test_table_compiles() {
        let registry = RouteRegistry::new(storefront_routes()).unwrap();
        assert_eq!(registry.entries().len(), 16);
    }

    #[test]
    fn test_protection_flags() {
        let registry = RouteRegistry::new(storefront_routes()).unwrap();
        let meta = |path: &str| registry.resolve(&path.into()).unwrap().meta;

        for public in ["/", "/category/1", "/product/9", "/login", "/missing/page"] {
            assert!(!meta(public).is_protected(), "{} should be public", public);
        }
        for customer in ["/purchase/9", "/orders", "/order/ORD123", "/profile"] {
            assert!(meta(customer).requires_auth(), "{}", customer);
            assert!(!meta(customer).requires_admin(), "{}", customer);
        }
        for admin in ["/admin", "/admin/cards", "/admin/settings"] {
            assert!(meta(admin).requires_admin(), "{}", admin);
        }
    }

    #[test]
    fn test_admin_orders_distinct_from_customer_orders() {
        let registry = RouteRegistry::new(storefront_routes()).unwrap();
        assert!(registry.resolve(&"/admin/orders".into()).unwrap().is_named("AdminOrders"));
        assert!(registry.resolve(&"/orders".into()).unwrap().is_named("Orders"));
    }
}
