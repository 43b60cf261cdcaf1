//! Canned API responses for running without network access or credentials.

use serde_json::{json, Value};

/// Response for `endpoint` given the query parameters that would have been sent.
pub fn response(endpoint: &str, params: &[(String, String)]) -> Value {
    if endpoint.contains("search") {
        let query = params
            .iter()
            .find(|(k, _)| k == "text")
            .map(|(_, v)| v.to_lowercase())
            .unwrap_or_default();
        return search(&query);
    }

    if endpoint.contains("models") {
        let model_id = endpoint.rsplit('/').next().unwrap_or_default();
        return json!({
            "id": model_id,
            "name": format!("Component {model_id}"),
            "price": {"value": 10000},
            "link": format!("https://market.yandex.ru/product/{model_id}"),
            "rating": 4.5,
            "photos": [{"url": format!("https://example.com/{model_id}.jpg")}]
        });
    }

    json!({"status": "ok", "data": []})
}

fn model(id: &str, name: &str, price: u32, rating: f64, photo: &str, specs: Value) -> Value {
    json!({
        "id": id,
        "name": name,
        "price": {"value": price},
        "link": format!("https://market.yandex.ru/product/{id}"),
        "rating": rating,
        "photos": [{"url": format!("https://example.com/{photo}.jpg")}],
        "specs": {"items": specs}
    })
}

fn search(query: &str) -> Value {
    let found = if query.contains("процессор") {
        model(
            "cpu1",
            "Intel Core i7-12700K",
            25000,
            4.8,
            "cpu",
            json!([
                {"name": "Количество ядер", "value": "12 шт"},
                {"name": "Частота процессора", "value": "3.6 ГГц"}
            ]),
        )
    } else if query.contains("видеокарта") {
        model(
            "gpu1",
            "NVIDIA GeForce RTX 3080",
            75000,
            4.9,
            "gpu",
            json!([{"name": "Объем видеопамяти", "value": "10 ГБ"}]),
        )
    } else if query.contains("память") {
        model(
            "ram1",
            "Kingston HyperX 16GB",
            5000,
            4.7,
            "ram",
            json!([
                {"name": "Объем одного модуля", "value": "16 ГБ"},
                {"name": "Тип памяти", "value": "DDR4"}
            ]),
        )
    } else if query.contains("накопитель") || query.contains("ssd") {
        model(
            "storage1",
            "Samsung 970 EVO 1TB",
            8000,
            4.8,
            "ssd",
            json!([
                {"name": "Объем накопителя", "value": "1 ТБ"},
                {"name": "Тип накопителя", "value": "SSD"}
            ]),
        )
    } else if query.contains("материнская плата") {
        model(
            "mb1",
            "ASUS ROG STRIX Z590-E",
            20000,
            4.6,
            "mb",
            json!([
                {"name": "Сокет", "value": "LGA1200"},
                {"name": "Форм-фактор", "value": "ATX"}
            ]),
        )
    } else if query.contains("блок питания") {
        model(
            "psu1",
            "Corsair RM750x",
            10000,
            4.7,
            "psu",
            json!([{"name": "Мощность", "value": "750 Вт"}]),
        )
    } else if query.contains("корпус") {
        model(
            "case1",
            "NZXT H510",
            7000,
            4.5,
            "case",
            json!([{"name": "Форм-фактор", "value": "ATX, microATX, mini-ITX"}]),
        )
    } else {
        return json!({"models": []});
    };

    json!({"models": [found]})
}
