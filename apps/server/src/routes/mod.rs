macros_utils::routes! {
    mod health,
    mod monitors,
}
