use indoc::indoc;

/// Entity and relationship catalogue of the inspection graph, injected into
/// every query-generation prompt.
pub const GRAPH_SCHEMA: &str = indoc! {r#"
    ## Graph Schema for Railway Anomaly Detection

    ### Nodes

    1. **Track** - a railway track/line
       - Properties: track_id (string), name (string), region (string), total_length_km (float), status (string)
       - Example: (:Track {track_id: 'TRACK-001', name: 'Main Line North', region: 'Northern Division'})

    2. **Segment** - a geographic section of a track
       - Properties: segment_id (string), start_km (float), end_km (float), lat (float), lng (float), terrain_type (string)
       - Example: (:Segment {segment_id: 'SEG-001-001', lat: 20.5, lng: 78.3, terrain_type: 'bridge'})

    3. **Inspection** - a single inspection event
       - Properties: inspection_id (string), media_id (string), timestamp (string), inspector_name (string), inspection_type (string)
       - Example: (:Inspection {inspection_id: 'INSP-abc123', timestamp: '2025-01-10T14:30:00', inspection_type: 'drone'})

    4. **Anomaly** - a detected defect
       - Properties: anomaly_id (string), anomaly_type (string), severity (string), confidence (float), image_path (string), status (string), detected_at (string)
       - anomaly_type values: crack, missing_bolt, missing_clamp, debris, rail_wear, broken_tie, gauge_deviation, vegetation_overgrowth, ballast_deficiency
       - severity values: LOW, MEDIUM, HIGH, CRITICAL
       - status values: open, verified, resolved, dismissed

    ### Relationships

    1. (:Segment)-[:PART_OF]->(:Track)
    2. (:Anomaly)-[:LOCATED_AT]->(:Segment)
    3. (:Anomaly)-[:FOUND_IN]->(:Inspection)

    ### Common Query Patterns

    - Anomalies by severity: MATCH (a:Anomaly {severity: 'HIGH'}) RETURN a
    - Anomalies on a track: MATCH (a:Anomaly)-[:LOCATED_AT]->(s:Segment)-[:PART_OF]->(t:Track {track_id: 'TRACK-001'}) RETURN a, s, t
    - Count by type: MATCH (a:Anomaly) RETURN a.anomaly_type, count(a) as count ORDER BY count DESC
    - Recent inspections: MATCH (i:Inspection) RETURN i ORDER BY i.timestamp DESC LIMIT 10
"#};

/// Worked question/query pairs shown to the model before the real question.
pub const FEW_SHOT_EXAMPLES: &str = indoc! {r#"
    ## Example Queries

    ### Example 1
    User: "Show me all critical cracks on Track 5"
    Cypher:
    ```cypher
    MATCH (a:Anomaly {anomaly_type: 'crack', severity: 'CRITICAL'})-[:LOCATED_AT]->(s:Segment)-[:PART_OF]->(t:Track)
    WHERE t.track_id CONTAINS '005' OR t.name CONTAINS '5'
    RETURN a.anomaly_id as id, a.anomaly_type as type, a.severity as severity,
           a.confidence as confidence, a.status as status, a.detected_at as detected_at,
           s.lat as lat, s.lng as lng, t.name as track_name
    ORDER BY a.detected_at DESC
    ```

    ### Example 2
    User: "How many anomalies are there by type?"
    Cypher:
    ```cypher
    MATCH (a:Anomaly)
    RETURN a.anomaly_type as anomaly_type, count(a) as count
    ORDER BY count DESC
    ```

    ### Example 3
    User: "What are the most recent HIGH severity issues?"
    Cypher:
    ```cypher
    MATCH (a:Anomaly {severity: 'HIGH'})-[:LOCATED_AT]->(s:Segment)-[:PART_OF]->(t:Track)
    MATCH (a)-[:FOUND_IN]->(i:Inspection)
    RETURN a.anomaly_id as id, a.anomaly_type as type, a.severity as severity,
           a.confidence as confidence, a.detected_at as detected_at,
           t.name as track_name, s.lat as lat, s.lng as lng,
           i.inspector_name as inspector
    ORDER BY a.detected_at DESC
    LIMIT 10
    ```

    ### Example 4
    User: "Give me a summary of the track with the most problems"
    Cypher:
    ```cypher
    MATCH (a:Anomaly)-[:LOCATED_AT]->(s:Segment)-[:PART_OF]->(t:Track)
    WITH t, count(a) as total_anomalies,
         sum(CASE WHEN a.severity = 'CRITICAL' THEN 1 ELSE 0 END) as critical,
         sum(CASE WHEN a.status = 'open' THEN 1 ELSE 0 END) as open_issues
    ORDER BY total_anomalies DESC
    LIMIT 1
    RETURN t.track_id as track_id, t.name as track_name, t.region as region,
           total_anomalies, critical, open_issues
    ```

    ### Example 5
    User: "Find segments with multiple defects"
    Cypher:
    ```cypher
    MATCH (a:Anomaly)-[:LOCATED_AT]->(s:Segment)-[:PART_OF]->(t:Track)
    WITH s, t, collect(a) as anomalies, count(a) as defect_count
    WHERE defect_count > 1
    RETURN s.segment_id as segment_id, s.lat as lat, s.lng as lng,
           t.name as track_name, defect_count,
           [x IN anomalies | x.anomaly_type] as defect_types
    ORDER BY defect_count DESC
    LIMIT 10
    ```
"#};
