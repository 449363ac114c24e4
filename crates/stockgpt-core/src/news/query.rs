use crate::models::NewsCategory;

/// Curated boolean keyword query for a category.
///
/// `All` has no query of its own; it is assembled from the concrete
/// categories instead.
pub fn category_query(category: NewsCategory) -> &'static str {
    match category {
        NewsCategory::All => "",
        NewsCategory::UsMarket => "(뉴욕증시 OR 다우존스 OR S&P500 OR 나스닥) AND (증시 OR 주가 OR 전망)",
        NewsCategory::UsTech => {
            "(애플 OR 마이크로소프트 OR 구글 OR 메타 OR 엔비디아 OR 테슬라) AND (주가 OR 실적 OR 전망)"
        }
        NewsCategory::KrKospi => "(코스피 OR 삼성전자 OR SK하이닉스 OR LG에너지솔루션) AND (주가 OR 증시 OR 실적)",
        NewsCategory::KrKosdaq => "(코스닥 OR 셀트리온 OR 에코프로 OR 카카오게임즈) AND (주가 OR 증시 OR 실적)",
        NewsCategory::CryptoBitcoin => "(비트코인 OR 가상자산) AND (시세 OR 가격 OR 전망)",
        NewsCategory::CryptoAltcoin => "(이더리움 OR 리플 OR 솔라나 OR 알트코인) AND (시세 OR 가격 OR 전망)",
    }
}
